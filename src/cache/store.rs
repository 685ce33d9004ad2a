//! Concurrent in-memory cache store.

use dashmap::DashMap;
use std::sync::Arc;

use crate::cache::{CacheEntry, CacheKey};
use crate::observability::metrics;

/// A thread-safe, unbounded map of cache keys to response snapshots.
///
/// Cloning the store clones the handle; all clones see the same entries.
/// Each `get`/`put`/`clear` runs under the map's shard locks, so a reader
/// either sees the whole previous entry or the whole new one.
#[derive(Debug, Clone, Default)]
pub struct CacheStore {
    inner: Arc<DashMap<CacheKey, Arc<CacheEntry>>>,
}

impl CacheStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry. No side effects.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        self.inner.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Insert or replace the entry for `key`. Last writer wins.
    pub fn put(&self, key: CacheKey, entry: CacheEntry) {
        let replaced = self.inner.insert(key, Arc::new(entry)).is_some();
        tracing::trace!(replaced, entries = self.inner.len(), "Cache entry stored");
        metrics::record_cache_size(self.inner.len());
    }

    /// Remove every entry, returning how many were removed.
    pub fn clear(&self) -> usize {
        let mut removed = 0;
        self.inner.retain(|_, _| {
            removed += 1;
            false
        });
        metrics::record_cache_size(self.inner.len());
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
