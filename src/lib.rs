/*!
 * procprofile
 * Process identity resolution and live network-policy profile sets
 */

pub mod core;
pub mod monitoring;
pub mod process;
pub mod profile;

// Re-exports
pub use crate::core::{
    pid_key, ConfigError, Error, IntrospectionError, Pid, ProfileId, RegistryError, ResolveError,
    ResolverConfig, Result, StoreError, Uid, UnprofiledPolicy,
};
pub use monitoring::{init_tracing, ResolverStats, ResolverStatsSnapshot};
pub use process::{
    FileInfo, FileInfoProvider, FsFileInfoProvider, MemoryProcessStore, Process,
    ProcessInfoSource, ProcessResolver, ProcessResolverBuilder, ProcessStore,
};
pub use profile::{
    ActiveProfileSetRegistry, Framework, MemoryProfileStore, Profile, ProfileFlag, ProfileFlags,
    ProfileLayer, ProfileSet, ProfileStore, RewriteRule,
};
