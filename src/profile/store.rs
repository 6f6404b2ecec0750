/*!
 * Profile Store
 * Lookup, creation and persistence of profiles by executable path
 */

use super::types::Profile;
use crate::core::errors::{ConfigError, StoreError, StoreResult};
use crate::core::types::ProfileId;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Profile persistence and path lookup
pub trait ProfileStore: Send + Sync {
    /// Best profile currently bound to `path`, or `StoreError::NotFound`
    fn get_active_profile_by_path(&self, path: &str) -> StoreResult<Arc<Profile>>;

    /// Find or create a profile for `path`; may persist a new profile
    fn find_profile_by_path(&self, path: &str, user_home: &str) -> StoreResult<Arc<Profile>>;

    /// Persist an edited profile
    fn save(&self, profile: Arc<Profile>) -> StoreResult<()>;

    /// Fetch a profile by id
    fn get(&self, id: &str) -> StoreResult<Arc<Profile>>;
}

/// Seed file contents: profiles plus path bindings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ProfileSeed {
    pub profiles: Vec<Profile>,
    /// Path (or directory prefix ending in `/`) to profile id
    pub bindings: HashMap<String, ProfileId>,
}

/// In-memory profile store
///
/// Exact path bindings win over directory-prefix bindings; among prefixes the
/// longest wins.
pub struct MemoryProfileStore {
    profiles: DashMap<ProfileId, Arc<Profile>>,
    exact: DashMap<String, ProfileId>,
    prefixes: RwLock<Vec<(String, ProfileId)>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: DashMap::new(),
            exact: DashMap::new(),
            prefixes: RwLock::new(Vec::new()),
        }
    }

    /// Build a store from a seed
    pub fn from_seed(seed: ProfileSeed) -> Self {
        let store = Self::new();
        for profile in seed.profiles {
            store.insert(profile);
        }
        for (path, id) in seed.bindings {
            store.bind(path, id);
        }
        store
    }

    /// Load a JSON seed file
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let seed: ProfileSeed = serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!(
            profiles = seed.profiles.len(),
            bindings = seed.bindings.len(),
            "loaded profile seed"
        );
        Ok(Self::from_seed(seed))
    }

    pub fn insert(&self, profile: Profile) -> Arc<Profile> {
        let profile = Arc::new(profile);
        self.profiles.insert(profile.id.clone(), Arc::clone(&profile));
        profile
    }

    /// Bind a path, or a directory prefix ending in `/`, to a profile id
    pub fn bind(&self, path: impl Into<String>, id: impl Into<ProfileId>) {
        let path = path.into();
        let id = id.into();
        if path.ends_with('/') {
            let mut prefixes = self.prefixes.write();
            prefixes.retain(|(p, _)| p != &path);
            prefixes.push((path, id));
            // Longest first so the first hit is the most specific
            prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        } else {
            self.exact.insert(path, id);
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    fn bound_id(&self, path: &str) -> Option<ProfileId> {
        if let Some(id) = self.exact.get(path) {
            return Some(id.value().clone());
        }
        self.prefixes
            .read()
            .iter()
            .find(|(prefix, _)| path.starts_with(prefix.as_str()))
            .map(|(_, id)| id.clone())
    }
}

impl Default for MemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get_active_profile_by_path(&self, path: &str) -> StoreResult<Arc<Profile>> {
        let id = self
            .bound_id(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        self.get(&id)
    }

    fn find_profile_by_path(&self, path: &str, user_home: &str) -> StoreResult<Arc<Profile>> {
        if path.is_empty() {
            return Err(StoreError::NotFound("<empty path>".to_string()));
        }

        let id = derived_id(path, user_home);
        if let Some(existing) = self.profiles.get(&id) {
            self.exact.insert(path.to_string(), id);
            return Ok(Arc::clone(existing.value()));
        }

        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());
        let profile = self.insert(Profile::new(id.clone(), name).as_default());
        self.exact.insert(path.to_string(), id);
        debug!(path, profile = %profile.id, "created default profile");
        Ok(profile)
    }

    fn save(&self, profile: Arc<Profile>) -> StoreResult<()> {
        self.profiles.insert(profile.id.clone(), profile);
        Ok(())
    }

    fn get(&self, id: &str) -> StoreResult<Arc<Profile>> {
        self.profiles
            .get(id)
            .map(|p| Arc::clone(p.value()))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

/// Stable id for a path-derived profile; paths under the user's home share
/// one id across users
fn derived_id(path: &str, user_home: &str) -> ProfileId {
    let home = user_home.trim_end_matches('/');
    if !home.is_empty() {
        if let Some(rest) = path.strip_prefix(home) {
            if rest.starts_with('/') {
                return format!("path:~{}", rest);
            }
        }
    }
    format!("path:{}", path)
}
