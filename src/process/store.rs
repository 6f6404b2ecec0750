/*!
 * Process Store
 * In-memory, session-scoped persistence of resolved processes
 */

use super::traits::ProcessStore;
use super::types::Process;
use crate::core::errors::{StoreError, StoreResult};
use dashmap::DashMap;
use std::sync::Arc;

/// Process records keyed by decimal pid
pub struct MemoryProcessStore {
    processes: DashMap<String, Arc<Process>>,
}

impl MemoryProcessStore {
    pub fn new() -> Self {
        Self {
            processes: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// All stored processes, sorted by pid
    pub fn list(&self) -> Vec<Arc<Process>> {
        let mut all: Vec<Arc<Process>> = self
            .processes
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        all.sort_by_key(|p| p.pid);
        all
    }

    /// Drop a record, e.g. once the OS reports the pid has exited
    pub fn remove(&self, pid_key: &str) -> Option<Arc<Process>> {
        self.processes.remove(pid_key).map(|(_, p)| p)
    }
}

impl Default for MemoryProcessStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessStore for MemoryProcessStore {
    fn get(&self, pid_key: &str) -> StoreResult<Arc<Process>> {
        self.processes
            .get(pid_key)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| StoreError::NotFound(pid_key.to_string()))
    }

    fn create(&self, pid_key: &str, process: Arc<Process>) -> StoreResult<()> {
        self.processes.insert(pid_key.to_string(), process);
        Ok(())
    }
}
