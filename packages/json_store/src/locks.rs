//! Per-collection locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Lock guarding a single collection. Writers take it exclusively, readers
/// (when reads are locked at all) take it shared.
pub type CollectionLock = Arc<RwLock<()>>;

/// Registry of collection locks, keyed by collection name.
///
/// Entries are created on first use and never removed, so every handle
/// returned for a given name refers to the same lock for the lifetime of the
/// registry.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<String, CollectionLock>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the lock for `collection`, inserting a fresh one if absent.
    ///
    /// The registry mutex is only held for the lookup, never while the
    /// returned lock is in use.
    pub fn get(&self, collection: &str) -> CollectionLock {
        // A poisoned registry still holds a consistent map; only whole entries
        // are ever inserted.
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(lock) = locks.get(collection) {
            return Arc::clone(lock);
        }

        let lock = CollectionLock::default();
        locks.insert(collection.to_string(), Arc::clone(&lock));
        lock
    }

    /// Number of collections that have a lock.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
