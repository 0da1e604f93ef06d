use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::exact::ExactCache;

/// Prefixed query text → unit-length query vector.
pub type EmbeddingCache = ExactCache<String, Arc<[f32]>>;

/// (query, document prefix) → cross-encoder score.
pub type RerankCache = ExactCache<RerankKey, f32>;

/// Key for [`RerankCache`]: the exact query and the exact truncated document text
/// that were fed to the cross-encoder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RerankKey {
    query: String,
    document_prefix: String,
}

impl RerankKey {
    pub fn new(query: impl Into<String>, document_prefix: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            document_prefix: document_prefix.into(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn document_prefix(&self) -> &str {
        &self.document_prefix
    }
}

/// Hit/miss/eviction counters.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl CacheStats {
    #[inline]
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStatsSnapshot {
    /// Hit rate in `[0.0, 1.0]` (0.0 when nothing was looked up yet).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
