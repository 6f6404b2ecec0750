/*!
 * Core Types
 * Common types used across the resolver
 */

/// Operating-system process ID
pub type Pid = u32;

/// Owner user ID
pub type Uid = u32;

/// Opaque profile identifier
pub type ProfileId = String;

/// Canonical persistence key for a pid (decimal string form)
#[inline]
pub fn pid_key(pid: Pid) -> String {
    pid.to_string()
}
