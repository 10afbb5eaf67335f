//! Caller-owned object cache.

use crate::api::response::ObjectInfo;
use crate::types::ObjectId;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Object states remembered across builds.
///
/// Object resolution consults the cache before the network and stores what
/// it fetches. Entries are never invalidated automatically; callers that
/// execute transactions should [`remove`](Self::remove) or
/// [`clear`](Self::clear) objects whose versions changed.
///
/// # Example
///
/// ```rust
/// use sui_tx_builder::api::{ObjectCache, ObjectInfo, Owner};
/// use sui_tx_builder::types::{ObjectDigest, SuiAddress};
///
/// let cache = ObjectCache::new();
/// let info = ObjectInfo {
///     object_id: SuiAddress::from_u64(7),
///     version: 3,
///     digest: ObjectDigest::ZERO,
///     owner: Owner::Immutable,
/// };
/// cache.insert(info);
/// assert_eq!(cache.get(&SuiAddress::from_u64(7)), Some(info));
/// ```
#[derive(Debug, Default)]
pub struct ObjectCache {
    objects: Mutex<HashMap<ObjectId, ObjectInfo>>,
}

impl ObjectCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ObjectId, ObjectInfo>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.objects
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Returns the cached state of `id`.
    pub fn get(&self, id: &ObjectId) -> Option<ObjectInfo> {
        self.lock().get(id).copied()
    }

    /// Stores an object state, replacing any previous one.
    pub fn insert(&self, info: ObjectInfo) {
        self.lock().insert(info.object_id, info);
    }

    /// Stores several object states.
    pub fn extend(&self, infos: impl IntoIterator<Item = ObjectInfo>) {
        self.lock()
            .extend(infos.into_iter().map(|info| (info.object_id, info)));
    }

    /// Forgets `id`.
    pub fn remove(&self, id: &ObjectId) -> Option<ObjectInfo> {
        self.lock().remove(id)
    }

    /// Forgets everything.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of cached objects.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
