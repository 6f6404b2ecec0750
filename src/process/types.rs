/*!
 * Process Types
 * Resolved process records and attached file metadata
 */

use crate::core::config::UnprofiledPolicy;
use crate::core::limits::{SYSTEM_PROCESS_NAME, SYSTEM_USER_NAME};
use crate::core::serde::{is_empty_str, is_none, is_zero_u32, optional_system_time_micros};
use crate::core::types::{Pid, Uid};
use crate::profile::types::{Profile, ProfileFlag, ProfileFlags};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

/// Metadata about a process executable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FileInfo {
    pub path: String,
    pub size: u64,
    #[serde(
        default,
        with = "optional_system_time_micros",
        skip_serializing_if = "is_none"
    )]
    pub modified: Option<SystemTime>,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub mode: u32,
    #[serde(default, skip_serializing_if = "is_none")]
    pub owner_uid: Option<Uid>,
    #[serde(default)]
    pub is_executable: bool,
}

/// A process observed during the current run
///
/// Records are session scoped: pids are reused by the OS over time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Process {
    pub pid: Pid,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub parent_pid: Pid,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub user_id: Uid,
    #[serde(default, skip_serializing_if = "is_empty_str")]
    pub user_name: String,
    #[serde(default, skip_serializing_if = "is_empty_str")]
    pub user_home: String,
    #[serde(default, skip_serializing_if = "is_empty_str")]
    pub exec_path: String,
    #[serde(default, skip_serializing_if = "is_empty_str")]
    pub cwd: String,
    #[serde(default, skip_serializing_if = "is_empty_str")]
    pub cmd_line: String,
    #[serde(default, skip_serializing_if = "is_empty_str")]
    pub name: String,
    /// `f:` file path, `d:` cache path, `c:`/`a:` remote fetch key
    #[serde(default, skip_serializing_if = "is_empty_str")]
    pub icon: String,
    #[serde(default, skip_serializing_if = "is_none")]
    pub file_info: Option<FileInfo>,
    #[serde(default, skip_serializing_if = "is_none")]
    pub profile_key: Option<String>,
    #[serde(default, skip_serializing_if = "is_none")]
    pub profile: Option<Arc<Profile>>,
}

impl Process {
    pub fn new(pid: Pid) -> Self {
        Self {
            pid,
            ..Default::default()
        }
    }

    /// Synthesized record for the kernel/idle process
    pub fn system(pid: Pid) -> Self {
        let mut process = Self::new(pid);
        process.user_name = SYSTEM_USER_NAME.to_string();
        process.name = SYSTEM_PROCESS_NAME.to_string();
        process.bind(Arc::new(Profile::system()));
        process
    }

    /// Bind a profile and record its key
    pub fn bind(&mut self, profile: Arc<Profile>) {
        self.profile_key = Some(profile.key());
        self.profile = Some(profile);
    }

    pub fn is_profiled(&self) -> bool {
        self.profile.is_some()
    }

    /// Flags the enforcement layer applies to this process
    pub fn effective_flags(&self, policy: UnprofiledPolicy) -> ProfileFlags {
        match (&self.profile, policy) {
            (Some(profile), _) => profile.flags.clone(),
            (None, UnprofiledPolicy::Deny) => ProfileFlags::new(),
            (None, UnprofiledPolicy::Allow) => [ProfileFlag::Internet, ProfileFlag::LocalNet]
                .into_iter()
                .collect(),
        }
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.profile {
            Some(profile) if !profile.default => {
                write!(f, "{}:{}:{}", self.user_name, profile, self.pid)
            }
            _ => write!(f, "{}:{}:{}", self.user_name, self.exec_path, self.pid),
        }
    }
}
