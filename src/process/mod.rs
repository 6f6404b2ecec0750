/*!
 * Process Module
 * Process identity resolution and profile matching
 */

pub mod fileinfo;
pub mod matcher;
#[cfg(target_os = "linux")]
pub mod procfs;
pub mod resolver;
pub mod store;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use fileinfo::FsFileInfoProvider;
pub use matcher::{MatchOutcome, ProfileMatcher};
#[cfg(target_os = "linux")]
pub use procfs::ProcfsInfoSource;
pub use resolver::{ProcessResolver, ProcessResolverBuilder};
pub use store::MemoryProcessStore;
pub use traits::{FileInfoProvider, ProcessInfoSource, ProcessStore};
pub use types::{FileInfo, Process};
