/*!
 * Profile Module
 * Network-policy profiles, framework indirections and live profile sets
 *
 * ## Features
 * - Capability flags consulted by the enforcement layer
 * - Framework rules for interpreters, wrappers and merged children
 * - Three-layer profile sets (identity / override / stamp)
 * - Registry that hot-swaps layers in every affected set
 *
 * ## Usage
 * ```ignore
 * use procprofile::profile::{ActiveProfileSetRegistry, Profile, ProfileSet};
 *
 * let registry = ActiveProfileSetRegistry::new();
 * let set = Arc::new(ProfileSet::new(Arc::new(Profile::new("firefox", "Firefox"))));
 * registry.activate(set.clone())?;
 *
 * // Later, from the profile-edit path
 * registry.update_identity_layer(Arc::new(edited_firefox));
 * ```
 */

pub mod framework;
pub mod registry;
pub mod set;
pub mod store;
pub mod types;

// Re-export commonly used items
pub use framework::program_of;
pub use registry::ActiveProfileSetRegistry;
pub use set::{ProfileLayer, ProfileSet, LAYER_COUNT};
pub use store::{MemoryProfileStore, ProfileSeed, ProfileStore};
pub use types::{
    is_system_pid, Framework, MatchAction, Profile, ProfileFlag, ProfileFlags, RewriteRule,
};
