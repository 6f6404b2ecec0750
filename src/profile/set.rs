/*!
 * Profile Sets
 * The three-layer live policy binding shared by everything using one identity
 */

use super::types::{Profile, ProfileFlags};
use crate::core::errors::{RegistryError, RegistryResult};
use parking_lot::{RwLock, RwLockWriteGuard};
use std::fmt;
use std::sync::Arc;

/// Number of layer slots in a set
pub const LAYER_COUNT: usize = 3;

/// Layer slots, in index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileLayer {
    /// Layer 0, its profile id is the registry key
    Identity = 0,
    /// Layer 1, an additional override
    Override = 1,
    /// Layer 2, the stamped/community profile
    Stamp = 2,
}

/// Slot storage; the identity layer is always populated
pub(super) struct Layers {
    identity: Arc<Profile>,
    override_layer: Option<Arc<Profile>>,
    stamp: Option<Arc<Profile>>,
}

impl Layers {
    fn get(&self, layer: ProfileLayer) -> Option<&Arc<Profile>> {
        match layer {
            ProfileLayer::Identity => Some(&self.identity),
            ProfileLayer::Override => self.override_layer.as_ref(),
            ProfileLayer::Stamp => self.stamp.as_ref(),
        }
    }

    fn to_array(&self) -> [Option<Arc<Profile>>; LAYER_COUNT] {
        [
            Some(Arc::clone(&self.identity)),
            self.override_layer.clone(),
            self.stamp.clone(),
        ]
    }
}

/// Live policy binding
///
/// All three slots are guarded by one lock. The identity id is fixed at
/// construction; the identity slot may only be replaced by a profile with the
/// same id.
pub struct ProfileSet {
    identity_id: String,
    layers: RwLock<Layers>,
}

impl ProfileSet {
    /// Create a set with only the identity layer populated
    pub fn new(identity: Arc<Profile>) -> Self {
        Self::with_layers(identity, None, None)
    }

    pub fn with_layers(
        identity: Arc<Profile>,
        override_layer: Option<Arc<Profile>>,
        stamp: Option<Arc<Profile>>,
    ) -> Self {
        Self {
            identity_id: identity.id.clone(),
            layers: RwLock::new(Layers {
                identity,
                override_layer,
                stamp,
            }),
        }
    }

    /// Registry key of this set
    pub fn identity_id(&self) -> &str {
        &self.identity_id
    }

    pub fn layer(&self, layer: ProfileLayer) -> Option<Arc<Profile>> {
        self.layers.read().get(layer).cloned()
    }

    pub fn identity(&self) -> Arc<Profile> {
        Arc::clone(&self.layers.read().identity)
    }

    /// Consistent copy of all three slots, in index order
    pub fn snapshot(&self) -> [Option<Arc<Profile>>; LAYER_COUNT] {
        self.layers.read().to_array()
    }

    /// Replace the identity layer, keeping the identity id
    pub fn replace_identity(&self, profile: Arc<Profile>) -> RegistryResult<Arc<Profile>> {
        if profile.id != self.identity_id {
            return Err(RegistryError::IdentityMismatch {
                expected: self.identity_id.clone(),
                found: profile.id.clone(),
            });
        }
        let mut layers = self.layers.write();
        Ok(swap_identity(&mut layers, profile))
    }

    pub fn set_override(&self, profile: Option<Arc<Profile>>) -> Option<Arc<Profile>> {
        std::mem::replace(&mut self.layers.write().override_layer, profile)
    }

    pub fn set_stamp(&self, profile: Option<Arc<Profile>>) -> Option<Arc<Profile>> {
        std::mem::replace(&mut self.layers.write().stamp, profile)
    }

    /// Effective capability flags
    ///
    /// The first layer with flags wins, in override, identity, stamp order.
    pub fn effective_flags(&self) -> ProfileFlags {
        let layers = self.layers.read();
        [ProfileLayer::Override, ProfileLayer::Identity, ProfileLayer::Stamp]
            .into_iter()
            .filter_map(|l| layers.get(l))
            .find(|p| !p.flags.is_empty())
            .map(|p| p.flags.clone())
            .unwrap_or_default()
    }

    /// Exclusive access to the slots; callers must already hold the registry lock
    pub(super) fn lock_layers(&self) -> RwLockWriteGuard<'_, Layers> {
        self.layers.write()
    }
}

pub(super) fn swap_identity(layers: &mut Layers, profile: Arc<Profile>) -> Arc<Profile> {
    std::mem::replace(&mut layers.identity, profile)
}

/// Replace the stamp slot if it currently holds a profile with the same id
pub(super) fn swap_stamp_if_same(layers: &mut Layers, profile: &Arc<Profile>) -> bool {
    let same = matches!(&layers.stamp, Some(current) if current.id == profile.id);
    if same {
        layers.stamp = Some(Arc::clone(profile));
    }
    same
}

impl fmt::Debug for ProfileSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layers = self.layers.read().to_array();
        let ids: Vec<Option<&str>> = layers
            .iter()
            .map(|l| l.as_deref().map(|p| p.id.as_str()))
            .collect();
        f.debug_struct("ProfileSet")
            .field("identity_id", &self.identity_id)
            .field("layers", &ids)
            .finish()
    }
}
