/*!
 * Process Traits
 * Boundaries to the OS process table, the process store and file metadata
 */

use super::types::{FileInfo, Process};
use crate::core::errors::{IntrospectionError, IntrospectionResult, StoreResult};
use crate::core::types::{Pid, Uid};
use std::sync::Arc;

/// Point queries against the OS process table for one pid
#[cfg_attr(test, mockall::automock)]
pub trait ProcessInfoSource: Send + Sync {
    /// Owner user id (POSIX only)
    fn owner_uid(&self, pid: Pid) -> IntrospectionResult<Uid>;

    fn owner_user_name(&self, pid: Pid) -> IntrospectionResult<String>;

    /// Home directory of the owner
    fn user_home(&self, _pid: Pid) -> IntrospectionResult<String> {
        Err(IntrospectionError::Unsupported("user_home".to_string()))
    }

    fn parent_id(&self, pid: Pid) -> IntrospectionResult<Pid>;

    fn executable_path(&self, pid: Pid) -> IntrospectionResult<String>;

    /// May be unsupported on some platforms
    fn working_directory(&self, pid: Pid) -> IntrospectionResult<String>;

    /// Arguments joined by single spaces
    fn command_line(&self, pid: Pid) -> IntrospectionResult<String>;

    fn name(&self, pid: Pid) -> IntrospectionResult<String>;

    /// Icon reference, if the platform can discover one
    fn icon(&self, _pid: Pid) -> IntrospectionResult<Option<String>> {
        Ok(None)
    }
}

/// Session-scoped persistence of resolved processes, keyed by decimal pid
pub trait ProcessStore: Send + Sync {
    /// Stored process, or `StoreError::NotFound`
    fn get(&self, pid_key: &str) -> StoreResult<Arc<Process>>;

    /// Store a process; an existing record under the key is replaced
    fn create(&self, pid_key: &str, process: Arc<Process>) -> StoreResult<()>;
}

/// Extended metadata for an executable
pub trait FileInfoProvider: Send + Sync {
    fn file_info(&self, path: &str) -> Option<FileInfo>;
}
