//! Exact-match caches for query embeddings and cross-encoder scores.
//!
//! Both caches are keyed by the exact bytes fed to the model, never by a
//! similarity lookup: a reused value is always the value computed for that key.

pub mod exact;
pub mod types;

#[cfg(test)]
mod tests;

pub use exact::ExactCache;
pub use types::{CacheStats, CacheStatsSnapshot, EmbeddingCache, RerankCache, RerankKey};
