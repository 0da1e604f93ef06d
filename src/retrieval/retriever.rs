use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use super::candidate::Candidate;
use super::confidence::{Confidence, ConfidenceThresholds};
use super::embedder::QueryEmbedder;
use super::error::RetrievalError;
use super::fallback::{Attempt, FilterUsed, choose_attempt, should_retry_unfiltered};
use super::reranker::CrossEncoderReranker;
use crate::cache::{EmbeddingCache, RerankCache};
use crate::constants::{
    DEFAULT_COLLECTION_NAME, DEFAULT_EMBED_CACHE_CAPACITY, DEFAULT_RERANK_CACHE_CAPACITY,
    DEFAULT_RERANK_TOP_N, DEFAULT_RETRIEVAL_TOP_K,
};
use crate::embedding::{CrossEncoderModel, EmbeddingModel};
use crate::vectordb::{VectorIndex, normalize_airline};

const WARMUP_TEXT: &str = "warmup";

#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    pub collection: String,
    /// Stage-one candidate count.
    pub top_k: usize,
    /// Results kept after reranking.
    pub top_n: usize,
    pub thresholds: ConfidenceThresholds,
    pub embed_cache_capacity: usize,
    pub rerank_cache_capacity: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION_NAME.to_string(),
            top_k: DEFAULT_RETRIEVAL_TOP_K,
            top_n: DEFAULT_RERANK_TOP_N,
            thresholds: ConfidenceThresholds::default(),
            embed_cache_capacity: DEFAULT_EMBED_CACHE_CAPACITY,
            rerank_cache_capacity: DEFAULT_RERANK_CACHE_CAPACITY,
        }
    }
}

impl RetrieverConfig {
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_cache_capacities(mut self, embed: usize, rerank: usize) -> Self {
        self.embed_cache_capacity = embed;
        self.rerank_cache_capacity = rerank;
        self
    }

    pub fn validate(&self) -> Result<(), RetrievalError> {
        let invalid = |reason: &str| RetrievalError::InvalidConfig {
            reason: reason.to_string(),
        };

        if self.collection.trim().is_empty() {
            return Err(invalid("collection name cannot be empty"));
        }
        if self.top_k == 0 {
            return Err(invalid("top_k must be > 0"));
        }
        if self.top_n == 0 {
            return Err(invalid("top_n must be > 0"));
        }
        if self.top_n > self.top_k {
            return Err(invalid("top_n cannot exceed top_k"));
        }
        if !(0.0..=1.0).contains(&self.thresholds.floor) {
            return Err(invalid("confidence floor must be within [0, 1]"));
        }
        Ok(())
    }
}

/// Ordered citable evidence for one query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub candidates: Vec<Candidate>,
    /// Best rerank score, `0.0` when nothing was found.
    pub top_score: f32,
    /// Airline filter that produced `candidates`, `"none"` if unfiltered.
    pub filter_used: FilterUsed,
    confidence: Confidence,
}

impl SearchOutcome {
    fn from_attempt(attempt: Attempt, thresholds: &ConfidenceThresholds) -> Self {
        Self {
            confidence: thresholds.classify(attempt.top_score),
            candidates: attempt.candidates,
            top_score: attempt.top_score,
            filter_used: attempt.filter,
        }
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Which components answered the warmup probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WarmupReport {
    pub embedder_ready: bool,
    pub reranker_ready: bool,
    pub index_ready: bool,
}

impl WarmupReport {
    pub fn all_ready(&self) -> bool {
        self.embedder_ready && self.reranker_ready && self.index_ready
    }
}

/// Two-stage retriever: dense search, cross-encoder rerank, airline fallback.
///
/// All state is owned by the instance; share it behind an `Arc` to serve
/// concurrent searches.
pub struct Retriever<E, R, V> {
    embedder: QueryEmbedder<E>,
    reranker: CrossEncoderReranker<R>,
    index: Arc<V>,
    config: RetrieverConfig,
}

impl<E, R, V> Retriever<E, R, V>
where
    E: EmbeddingModel + 'static,
    R: CrossEncoderModel + 'static,
    V: VectorIndex,
{
    pub fn new(
        embed_model: Arc<E>,
        cross_encoder: Arc<R>,
        index: Arc<V>,
        config: RetrieverConfig,
    ) -> Result<Self, RetrievalError> {
        config.validate()?;

        Ok(Self {
            embedder: QueryEmbedder::new(embed_model, config.embed_cache_capacity),
            reranker: CrossEncoderReranker::new(cross_encoder, config.rerank_cache_capacity),
            index,
            config,
        })
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    pub fn index(&self) -> &Arc<V> {
        &self.index
    }

    pub fn embedding_cache(&self) -> &EmbeddingCache {
        self.embedder.cache()
    }

    pub fn rerank_cache(&self) -> &RerankCache {
        self.reranker.cache()
    }

    /// Stage one: nearest chunks, ascending by distance.
    ///
    /// The filter is trimmed and lowercased; a blank filter means unfiltered.
    /// A `top_k` of `None` or `0` uses the configured value.
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: Option<usize>,
        airline_filter: Option<&str>,
    ) -> Result<Vec<Candidate>, RetrievalError> {
        let top_k = top_k.filter(|&k| k > 0).unwrap_or(self.config.top_k);
        let airline = airline_filter.and_then(normalize_airline);

        let vector = self.embedder.embed_query(query).await?;
        let hits = self
            .index
            .search(
                &self.config.collection,
                vector.to_vec(),
                top_k as u64,
                airline.as_deref(),
            )
            .await?;

        Ok(hits.into_iter().map(Candidate::from).collect())
    }

    /// Stage two: see [`CrossEncoderReranker::rerank`]. A `top_n` of `None` or
    /// `0` uses the configured value.
    pub async fn rerank(
        &self,
        query: &str,
        candidates: Vec<Candidate>,
        top_n: Option<usize>,
        exclude_non_citable: bool,
    ) -> Result<Vec<Candidate>, RetrievalError> {
        self.reranker
            .rerank(
                query,
                candidates,
                top_n.filter(|&n| n > 0).unwrap_or(self.config.top_n),
                exclude_non_citable,
            )
            .await
    }

    /// Retrieve, rerank and apply the airline fallback.
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn search(
        &self,
        query: &str,
        airline_filter: Option<&str>,
    ) -> Result<SearchOutcome, RetrievalError> {
        let requested = FilterUsed::from_normalized(airline_filter.and_then(normalize_airline));
        let thresholds = &self.config.thresholds;

        let first = self.attempt(query, requested).await?;

        let retry = if should_retry_unfiltered(&first, thresholds) {
            info!(
                filter = %first.filter,
                score = first.top_score,
                floor = thresholds.floor,
                "Filtered search below floor, retrying without airline filter"
            );
            Some(self.attempt(query, FilterUsed::None).await?)
        } else {
            None
        };

        let chosen = choose_attempt(first, retry);
        let outcome = SearchOutcome::from_attempt(chosen, thresholds);

        info!(
            results = outcome.candidates.len(),
            top_score = outcome.top_score,
            filter_used = %outcome.filter_used,
            confidence = %outcome.confidence(),
            "Search complete"
        );

        Ok(outcome)
    }

    async fn attempt(&self, query: &str, filter: FilterUsed) -> Result<Attempt, RetrievalError> {
        let candidates = self.retrieve(query, None, filter.airline()).await?;
        let ranked = self.rerank(query, candidates, None, true).await?;
        Ok(Attempt::new(ranked, filter))
    }

    /// Exercises both models and the index once. Failures are logged, not returned.
    #[instrument(skip(self))]
    pub async fn warmup(&self) -> WarmupReport {
        let (embedder_ready, reranker_ready, index_ready) = tokio::join!(
            self.warm_embedder(),
            self.warm_reranker(),
            self.index.is_ready()
        );

        if !index_ready {
            warn!(collection = %self.config.collection, "Vector index not reachable during warmup");
        }

        let report = WarmupReport {
            embedder_ready,
            reranker_ready,
            index_ready,
        };
        info!(?report, "Warmup finished");
        report
    }

    async fn warm_embedder(&self) -> bool {
        match self.embedder.embed_query(WARMUP_TEXT).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Embedder warmup failed");
                false
            }
        }
    }

    async fn warm_reranker(&self) -> bool {
        let model = Arc::clone(self.reranker.model());
        let result =
            tokio::task::spawn_blocking(move || model.predict(&[(WARMUP_TEXT, WARMUP_TEXT)]))
                .await;

        match result {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "Reranker warmup failed");
                false
            }
            Err(e) => {
                warn!(error = %e, "Reranker warmup task failed");
                false
            }
        }
    }
}
