use std::sync::Arc;

use tracing::debug;

use super::error::RetrievalError;
use crate::cache::EmbeddingCache;
use crate::constants::QUERY_PREFIX;
use crate::embedding::utils::normalize_l2;
use crate::embedding::{EmbeddingError, EmbeddingModel};

/// Query embedding with the `query: ` prefix and an exact-match cache.
pub struct QueryEmbedder<E> {
    model: Arc<E>,
    cache: EmbeddingCache,
}

impl<E: EmbeddingModel + 'static> QueryEmbedder<E> {
    pub fn new(model: Arc<E>, cache_capacity: usize) -> Self {
        Self {
            model,
            cache: EmbeddingCache::with_capacity(cache_capacity),
        }
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    pub fn model(&self) -> &Arc<E> {
        &self.model
    }

    /// Unit-length embedding of `query: {text}`, computed at most once per key
    /// while it stays cached.
    pub async fn embed_query(&self, text: &str) -> Result<Arc<[f32]>, RetrievalError> {
        let key = format!("{QUERY_PREFIX}{text}");

        if let Some(vector) = self.cache.get(&key) {
            debug!(query_len = text.len(), "Embedding cache hit");
            return Ok(vector);
        }

        let model = Arc::clone(&self.model);
        let input = key.clone();
        let mut vectors = tokio::task::spawn_blocking(move || model.encode(&[input.as_str()]))
            .await
            .map_err(|e| RetrievalError::TaskFailed {
                stage: "embed",
                message: e.to_string(),
            })??;

        if vectors.len() != 1 {
            return Err(EmbeddingError::OutputCountMismatch {
                expected: 1,
                actual: vectors.len(),
            }
            .into());
        }

        let mut vector = vectors.swap_remove(0);
        normalize_l2(&mut vector);
        let vector: Arc<[f32]> = vector.into();

        debug!(
            query_len = text.len(),
            dim = vector.len(),
            "Embedding cache miss, stored"
        );
        self.cache.set(key, Arc::clone(&vector));

        Ok(vector)
    }
}
