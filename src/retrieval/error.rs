use thiserror::Error;

use crate::embedding::{EmbeddingError, RerankerError};
use crate::vectordb::VectorDbError;

/// Errors surfaced by [`Retriever`](super::Retriever) operations.
///
/// "No results" is never an error; these cover unavailable models or index
/// and bad configuration.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("reranking failed: {0}")]
    Reranker(#[from] RerankerError),

    #[error("vector index error: {0}")]
    VectorDb(#[from] VectorDbError),

    #[error("invalid retriever configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A blocking inference task panicked or was cancelled.
    #[error("{stage} task failed: {message}")]
    TaskFailed {
        stage: &'static str,
        message: String,
    },
}

impl RetrievalError {
    /// `true` for failures caused by the index rather than the models.
    pub fn is_index_error(&self) -> bool {
        matches!(self, RetrievalError::VectorDb(_))
    }
}
