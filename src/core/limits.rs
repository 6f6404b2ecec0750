/*!
 * Resolver Limits and Constants
 *
 * Centralized location for the bounds that keep identity resolution finite.
 */

use super::types::Pid;

// =============================================================================
// MATCHING LIMITS
// =============================================================================

/// Maximum profile-matching iterations per resolution
/// Lookup errors and framework hops all count toward this bound
pub const MAX_MATCH_ITERATIONS: usize = 10;

/// Maximum merge-with-parent delegations per resolve call
/// Each delegation moves strictly up the ancestry, so real chains are short
pub const MAX_MERGE_DELEGATIONS: usize = 16;

// =============================================================================
// PLATFORM
// =============================================================================

/// Kernel/idle process ID on this platform
#[cfg(target_os = "windows")]
pub const SYSTEM_PID: Pid = 4;

/// Kernel/idle process ID on this platform
#[cfg(not(target_os = "windows"))]
pub const SYSTEM_PID: Pid = 0;

/// Name assigned to the synthesized system process owner
pub const SYSTEM_USER_NAME: &str = "Kernel";

/// Name assigned to the synthesized system process
pub const SYSTEM_PROCESS_NAME: &str = "Operating System";

/// Profile id of the built-in operating system profile
pub const SYSTEM_PROFILE_ID: &str = "_system";
