use std::sync::Arc;

use tracing::debug;

use super::candidate::Candidate;
use super::error::RetrievalError;
use crate::cache::{RerankCache, RerankKey};
use crate::constants::RERANK_DOC_PREFIX_CHARS;
use crate::embedding::{CrossEncoderModel, RerankerError};

/// First `max_chars` characters of `text` (char boundaries, not bytes).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Stage-two scoring with a per-pair score cache.
pub struct CrossEncoderReranker<R> {
    model: Arc<R>,
    cache: RerankCache,
}

impl<R: CrossEncoderModel + 'static> CrossEncoderReranker<R> {
    pub fn new(model: Arc<R>, cache_capacity: usize) -> Self {
        Self {
            model,
            cache: RerankCache::with_capacity(cache_capacity),
        }
    }

    pub fn cache(&self) -> &RerankCache {
        &self.cache
    }

    pub fn model(&self) -> &Arc<R> {
        &self.model
    }

    /// Scores, orders and trims `candidates`.
    ///
    /// Cached pairs are reused and every miss goes to the model in a single
    /// batch. `do_not_cite` chunks are dropped after sorting, before the
    /// `top_n` cut. Empty input returns immediately without a model call.
    pub async fn rerank(
        &self,
        query: &str,
        mut candidates: Vec<Candidate>,
        top_n: usize,
        exclude_non_citable: bool,
    ) -> Result<Vec<Candidate>, RetrievalError> {
        if candidates.is_empty() {
            return Ok(candidates);
        }

        let prefixes: Vec<String> = candidates
            .iter()
            .map(|c| truncate_chars(&c.text, RERANK_DOC_PREFIX_CHARS).to_string())
            .collect();

        let mut scores: Vec<Option<f32>> = prefixes
            .iter()
            .map(|prefix| self.cache.get(&RerankKey::new(query, prefix.as_str())))
            .collect();

        let misses: Vec<usize> = scores
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.is_none().then_some(i))
            .collect();

        debug!(
            candidates = candidates.len(),
            cache_hits = candidates.len() - misses.len(),
            misses = misses.len(),
            "Reranking candidates"
        );

        if !misses.is_empty() {
            let fresh = self.predict_batch(query, &misses, &prefixes).await?;
            for (&i, score) in misses.iter().zip(fresh) {
                self.cache
                    .set(RerankKey::new(query, prefixes[i].as_str()), score);
                scores[i] = Some(score);
            }
        }

        for (candidate, score) in candidates.iter_mut().zip(scores) {
            candidate.rerank_score = score;
        }

        // Stable: equal scores keep retrieval order.
        candidates.sort_by(|a, b| b.score().total_cmp(&a.score()));

        if exclude_non_citable {
            candidates.retain(Candidate::is_citable);
        }

        candidates.truncate(top_n);
        Ok(candidates)
    }

    async fn predict_batch(
        &self,
        query: &str,
        misses: &[usize],
        prefixes: &[String],
    ) -> Result<Vec<f32>, RetrievalError> {
        let model = Arc::clone(&self.model);
        let query = query.to_string();
        let documents: Vec<String> = misses.iter().map(|&i| prefixes[i].clone()).collect();
        let expected = documents.len();

        let scores = tokio::task::spawn_blocking(move || {
            let pairs: Vec<(&str, &str)> = documents
                .iter()
                .map(|d| (query.as_str(), d.as_str()))
                .collect();
            model.predict(&pairs)
        })
        .await
        .map_err(|e| RetrievalError::TaskFailed {
            stage: "rerank",
            message: e.to_string(),
        })??;

        if scores.len() != expected {
            return Err(RerankerError::ScoreCountMismatch {
                expected,
                actual: scores.len(),
            }
            .into());
        }

        if let Some((index, &score)) = scores.iter().enumerate().find(|(_, s)| !s.is_finite()) {
            return Err(RerankerError::NonFiniteScore { index, score }.into());
        }

        Ok(scores)
    }
}
