/*!
 * Shared test fixtures
 * In-memory process table with query counting
 */

#![allow(dead_code)]

use parking_lot::RwLock;
use procprofile::{IntrospectionError, Pid, ProcessInfoSource, Uid};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const HOME: &str = "/home/alice";

#[derive(Debug, Clone, Default)]
pub struct FakeEntry {
    pub uid: Uid,
    pub user: String,
    pub ppid: Pid,
    pub exe: String,
    pub cwd: String,
    pub cmd_line: String,
    pub name: String,
    pub icon: Option<String>,
}

/// Process table fixture; counts every executable-path query
#[derive(Default)]
pub struct FakeProcessTable {
    entries: RwLock<HashMap<Pid, FakeEntry>>,
    exe_queries: AtomicUsize,
    delay: Option<Duration>,
}

impl FakeProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep inside each executable-path query
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn add(&self, pid: Pid, ppid: Pid, cmd_line: &str) -> &Self {
        let exe = cmd_line.split_whitespace().next().unwrap_or("").to_string();
        let name = exe.rsplit('/').next().unwrap_or("").to_string();
        self.entries.write().insert(
            pid,
            FakeEntry {
                uid: 1000,
                user: "alice".to_string(),
                ppid,
                exe,
                cwd: HOME.to_string(),
                cmd_line: cmd_line.to_string(),
                name,
                icon: None,
            },
        );
        self
    }

    pub fn set_icon(&self, pid: Pid, icon: &str) {
        if let Some(entry) = self.entries.write().get_mut(&pid) {
            entry.icon = Some(icon.to_string());
        }
    }

    pub fn exe_queries(&self) -> usize {
        self.exe_queries.load(Ordering::SeqCst)
    }

    fn with<T>(&self, pid: Pid, f: impl FnOnce(&FakeEntry) -> T) -> Result<T, IntrospectionError> {
        self.entries
            .read()
            .get(&pid)
            .map(f)
            .ok_or(IntrospectionError::NoSuchProcess(pid))
    }
}

impl ProcessInfoSource for FakeProcessTable {
    fn owner_uid(&self, pid: Pid) -> Result<Uid, IntrospectionError> {
        self.with(pid, |e| e.uid)
    }

    fn owner_user_name(&self, pid: Pid) -> Result<String, IntrospectionError> {
        self.with(pid, |e| e.user.clone())
    }

    fn user_home(&self, pid: Pid) -> Result<String, IntrospectionError> {
        self.with(pid, |_| HOME.to_string())
    }

    fn parent_id(&self, pid: Pid) -> Result<Pid, IntrospectionError> {
        self.with(pid, |e| e.ppid)
    }

    fn executable_path(&self, pid: Pid) -> Result<String, IntrospectionError> {
        self.exe_queries.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.with(pid, |e| e.exe.clone())
    }

    fn working_directory(&self, pid: Pid) -> Result<String, IntrospectionError> {
        self.with(pid, |e| e.cwd.clone())
    }

    fn command_line(&self, pid: Pid) -> Result<String, IntrospectionError> {
        self.with(pid, |e| e.cmd_line.clone())
    }

    fn name(&self, pid: Pid) -> Result<String, IntrospectionError> {
        self.with(pid, |e| e.name.clone())
    }

    fn icon(&self, pid: Pid) -> Result<Option<String>, IntrospectionError> {
        self.with(pid, |e| e.icon.clone())
    }
}
