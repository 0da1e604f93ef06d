use super::error::EmbeddingError;
use super::reranker::RerankerError;

/// Bi-encoder: maps already-prefixed strings to unit-length vectors.
///
/// Implementations block for the duration of inference; async callers should
/// run them on the blocking pool.
pub trait EmbeddingModel: Send + Sync {
    /// Encodes `texts` in one call, returning one vector per input in input order.
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Cross-encoder: scores `(query, document)` pairs jointly.
///
/// Implementations block for the duration of inference; async callers should
/// run them on the blocking pool.
pub trait CrossEncoderModel: Send + Sync {
    /// Scores every pair in one batched call, returning scores in input order.
    fn predict(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>, RerankerError>;
}
