//! Waypoint: evidence retrieval for airline-dispute questions.
//!
//! A query is answered from a policy corpus in two stages: dense search over
//! chunk embeddings in Qdrant (optionally restricted to one airline), then a
//! cross-encoder rerank of the candidates. A low-scoring airline-filtered
//! search is retried unfiltered, and the better of the two is returned along
//! with the filter that produced it.
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`Retriever`], [`RetrieverConfig`], [`SearchOutcome`] - search entry point
//! - [`Candidate`], [`FilterUsed`], [`Confidence`] - results
//! - [`Config`], [`ConfigError`] - environment configuration
//!
//! ## Models
//! - [`E5Embedder`], [`EncoderConfig`] - query embeddings
//! - [`Reranker`], [`RerankerConfig`] - cross-encoder scoring
//! - [`LazyModel`] - deferred, at-most-once model loading
//!
//! ## Vector Index
//! - [`VectorIndex`], [`QdrantIndex`] - chunk storage and search
//! - [`inspect_store`], [`StoreReport`] - store health check
//!
//! ## Test/Mock Support
//! Mock models and an in-memory index are available behind
//! `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod retrieval;
pub mod vectordb;

pub use cache::{CacheStatsSnapshot, EmbeddingCache, ExactCache, RerankCache, RerankKey};
pub use config::{Config, ConfigError};
pub use constants::{DimValidationError, validate_embedding_dim};
pub use embedding::{
    CrossEncoderModel, E5Embedder, EmbeddingError, EmbeddingModel, EncoderConfig, LazyModel,
    Reranker, RerankerConfig, RerankerError,
};
#[cfg(any(test, feature = "mock"))]
pub use embedding::{MockCrossEncoder, MockEmbeddingModel};
pub use retrieval::{
    Candidate, Confidence, ConfidenceThresholds, FilterUsed, RetrievalError, Retriever,
    RetrieverConfig, SearchOutcome, WarmupReport,
};
#[cfg(any(test, feature = "mock"))]
pub use vectordb::MockVectorIndex;
pub use vectordb::{
    ChunkMetadata, DocumentChunk, QdrantIndex, StoreReport, VectorDbError, VectorIndex,
    inspect_store,
};
