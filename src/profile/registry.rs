/*!
 * Active Profile Set Registry
 * Table of live profile sets, keyed by identity profile id
 *
 * ## Lock Order
 * Every operation takes the registry lock first and a set lock second.
 * Nothing acquires a set lock and then the registry lock, so mixed
 * activate/deactivate/update traffic cannot deadlock.
 */

use super::set::{swap_identity, swap_stamp_if_same, ProfileSet};
use super::types::Profile;
use crate::core::errors::{RegistryError, RegistryResult};
use crate::core::types::ProfileId;
use ahash::RandomState;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

type SetTable = HashMap<ProfileId, Arc<ProfileSet>, RandomState>;

struct RegistryState {
    open: bool,
    sets: SetTable,
}

/// Registry of active profile sets
///
/// Construct one per service; a shut down registry rejects activations.
pub struct ActiveProfileSetRegistry {
    state: RwLock<RegistryState>,
}

impl ActiveProfileSetRegistry {
    pub fn new() -> Self {
        debug!("Initializing active profile set registry");
        Self {
            state: RwLock::new(RegistryState {
                open: true,
                sets: SetTable::default(),
            }),
        }
    }

    /// Register `set` under its identity id
    ///
    /// Returns the set previously registered under that id, if any.
    pub fn activate(&self, set: Arc<ProfileSet>) -> RegistryResult<Option<Arc<ProfileSet>>> {
        let mut state = self.state.write();
        if !state.open {
            return Err(RegistryError::ShutDown);
        }

        // Held until the set is visible so no reader observes it mid-mutation
        let _layers = set.lock_layers();
        let key = set.identity_id().to_string();
        let previous = state.sets.insert(key, Arc::clone(&set));
        debug!(identity = set.identity_id(), replaced = previous.is_some(), "profile set activated");
        Ok(previous)
    }

    /// Remove the entry for `set`'s identity id; no-op if absent
    pub fn deactivate(&self, set: &ProfileSet) -> bool {
        let mut state = self.state.write();
        let _layers = set.lock_layers();
        let removed = state.sets.remove(set.identity_id()).is_some();
        if removed {
            debug!(identity = set.identity_id(), "profile set deactivated");
        }
        removed
    }

    /// Replace layer 0 of the set registered under `profile.id`
    ///
    /// Exact id match only. Returns whether a set was updated.
    pub fn update_identity_layer(&self, profile: Arc<Profile>) -> bool {
        let state = self.state.read();
        match state.sets.get(&profile.id) {
            Some(set) => {
                let mut layers = set.lock_layers();
                swap_identity(&mut layers, profile);
                true
            }
            None => false,
        }
    }

    /// Replace layer 2 in every set whose stamp layer has `profile.id`
    ///
    /// Returns the number of sets updated.
    pub fn update_stamp_layer(&self, profile: Arc<Profile>) -> usize {
        let state = self.state.read();
        let updated = state
            .sets
            .values()
            .filter(|set| {
                let mut layers = set.lock_layers();
                swap_stamp_if_same(&mut layers, &profile)
            })
            .count();
        debug!(stamp = %profile.id, updated, "stamp layer broadcast");
        updated
    }

    pub fn get(&self, identity_id: &str) -> Option<Arc<ProfileSet>> {
        self.state.read().sets.get(identity_id).cloned()
    }

    pub fn contains(&self, identity_id: &str) -> bool {
        self.state.read().sets.contains_key(identity_id)
    }

    pub fn len(&self) -> usize {
        self.state.read().sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().sets.is_empty()
    }

    /// Registered identity ids, sorted
    pub fn identity_ids(&self) -> Vec<ProfileId> {
        let mut ids: Vec<ProfileId> = self.state.read().sets.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn is_open(&self) -> bool {
        self.state.read().open
    }

    /// Close the registry and hand back every registered set
    pub fn shutdown(&self) -> Vec<Arc<ProfileSet>> {
        let mut state = self.state.write();
        state.open = false;
        let drained: Vec<Arc<ProfileSet>> = state.sets.drain().map(|(_, set)| set).collect();
        info!(sets = drained.len(), "active profile set registry shut down");
        drained
    }
}

impl Default for ActiveProfileSetRegistry {
    fn default() -> Self {
        Self::new()
    }
}
