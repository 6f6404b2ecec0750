/*!
 * procfs Process Source
 * Linux process-table queries backed by /proc
 */

use super::traits::ProcessInfoSource;
use crate::core::errors::{IntrospectionError, IntrospectionResult};
use crate::core::types::{Pid, Uid};
use nix::unistd::User;
use std::io;
use std::path::{Path, PathBuf};

/// Reads process metadata from a procfs mount
#[derive(Debug, Clone)]
pub struct ProcfsInfoSource {
    root: PathBuf,
}

impl ProcfsInfoSource {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Use an alternative procfs root
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Numeric pids currently listed under the root
    pub fn list_pids(&self) -> io::Result<Vec<Pid>> {
        let mut pids: Vec<Pid> = std::fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
            .collect();
        pids.sort_unstable();
        Ok(pids)
    }

    fn pid_dir(&self, pid: Pid) -> PathBuf {
        self.root.join(pid.to_string())
    }

    fn map_err(&self, pid: Pid, field: &str, err: io::Error) -> IntrospectionError {
        if err.kind() == io::ErrorKind::NotFound && !self.pid_dir(pid).exists() {
            IntrospectionError::NoSuchProcess(pid)
        } else {
            IntrospectionError::query(pid, field, err)
        }
    }

    fn read(&self, pid: Pid, file: &str, field: &str) -> IntrospectionResult<String> {
        std::fs::read_to_string(self.pid_dir(pid).join(file))
            .map_err(|e| self.map_err(pid, field, e))
    }

    fn read_link(&self, pid: Pid, file: &str, field: &str) -> IntrospectionResult<String> {
        std::fs::read_link(self.pid_dir(pid).join(file))
            .map(|p| p.to_string_lossy().into_owned())
            .map_err(|e| self.map_err(pid, field, e))
    }

    /// First value of a `Key:\tvalue ...` line in /proc/<pid>/status
    fn status_field(&self, pid: Pid, key: &str) -> IntrospectionResult<String> {
        let status = self.read(pid, "status", key)?;
        parse_status_field(&status, key)
            .map(str::to_string)
            .ok_or_else(|| IntrospectionError::query(pid, key, "missing from status"))
    }

    fn owner(&self, pid: Pid) -> IntrospectionResult<User> {
        let uid = self.owner_uid(pid)?;
        match User::from_uid(nix::unistd::Uid::from_raw(uid)) {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(IntrospectionError::query(
                pid,
                "owner",
                format!("no user database entry for uid {}", uid),
            )),
            Err(e) => Err(IntrospectionError::query(pid, "owner", e)),
        }
    }
}

impl Default for ProcfsInfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessInfoSource for ProcfsInfoSource {
    fn owner_uid(&self, pid: Pid) -> IntrospectionResult<Uid> {
        let raw = self.status_field(pid, "Uid")?;
        raw.parse()
            .map_err(|e| IntrospectionError::query(pid, "Uid", e))
    }

    fn owner_user_name(&self, pid: Pid) -> IntrospectionResult<String> {
        Ok(self.owner(pid)?.name)
    }

    fn user_home(&self, pid: Pid) -> IntrospectionResult<String> {
        Ok(self.owner(pid)?.dir.to_string_lossy().into_owned())
    }

    fn parent_id(&self, pid: Pid) -> IntrospectionResult<Pid> {
        let raw = self.status_field(pid, "PPid")?;
        raw.parse()
            .map_err(|e| IntrospectionError::query(pid, "PPid", e))
    }

    fn executable_path(&self, pid: Pid) -> IntrospectionResult<String> {
        let path = self.read_link(pid, "exe", "exe")?;
        // The kernel marks replaced binaries
        Ok(path.trim_end_matches(" (deleted)").to_string())
    }

    fn working_directory(&self, pid: Pid) -> IntrospectionResult<String> {
        self.read_link(pid, "cwd", "cwd")
    }

    fn command_line(&self, pid: Pid) -> IntrospectionResult<String> {
        let raw = self.read(pid, "cmdline", "cmdline")?;
        Ok(join_cmdline(&raw))
    }

    fn name(&self, pid: Pid) -> IntrospectionResult<String> {
        self.status_field(pid, "Name")
    }
}

fn parse_status_field<'a>(status: &'a str, key: &str) -> Option<&'a str> {
    status.lines().find_map(|line| {
        let (k, rest) = line.split_once(':')?;
        if k != key {
            return None;
        }
        rest.split_whitespace().next()
    })
}

fn join_cmdline(raw: &str) -> String {
    raw.split('\0')
        .filter(|arg| !arg.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether `path` looks like a procfs root
pub fn is_procfs_root(path: &Path) -> bool {
    path.join("self").exists()
}
