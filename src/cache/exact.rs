//! Bounded exact-match LRU cache shared across concurrent searches.
//!
//! One mutex guards the whole map. Every operation is an O(1) map update, so the
//! lock is never held across model inference or I/O.

use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use super::types::CacheStats;

/// Exact-match key → value cache with least-recently-used eviction.
///
/// - `get` on a hit refreshes the entry's recency.
/// - `set` on a full cache evicts the least-recently-used entry first.
/// - Entries never expire; keys are exact copies of immutable inputs.
pub struct ExactCache<K, V> {
    entries: Mutex<LruCache<K, V>>,
    stats: CacheStats,
}

impl<K: Hash + Eq, V: Clone> ExactCache<K, V> {
    /// Creates a cache holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            stats: CacheStats::default(),
        }
    }

    /// Returns a clone of the cached value and marks it most-recently-used.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(value) => {
                self.stats.record_hit();
                Some(value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Stores `value` under `key`, evicting the least-recently-used entry if full.
    pub fn set(&self, key: K, value: V) {
        let mut entries = self.entries.lock();
        // Only count an eviction when the cache is full AND the key is new.
        if entries.len() == entries.cap().get() && !entries.contains(&key) {
            self.stats.record_eviction();
        }
        entries.put(key, value);
    }

    /// Returns `true` if `key` is present, without touching recency.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.lock().contains(key)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    /// Drops every entry. Statistics are kept.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl<K: Hash + Eq, V> std::fmt::Debug for ExactCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("ExactCache")
            .field("len", &entries.len())
            .field("capacity", &entries.cap().get())
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}
