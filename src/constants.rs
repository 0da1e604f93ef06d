//! Cross-cutting, shared constants.
//!
//! Prefer deriving secondary constants from primary ones to avoid drift.
//!
//! # Confidence Floor
//!
//! [`LOW_CONFIDENCE_FLOOR`] is read by two call sites that must agree: the
//! filter-fallback policy in [`crate::retrieval`] and the confidence
//! classifier the decision layer uses to decide whether to answer at all.
//! Both go through [`ConfidenceThresholds`](crate::retrieval::ConfidenceThresholds),
//! whose default is built from this constant.

/// Output dimension of the default query/passage encoder (`e5-base-v2`).
pub const DEFAULT_EMBEDDING_DIM: usize = 768;

pub const DEFAULT_VECTOR_SIZE_U64: u64 = DEFAULT_EMBEDDING_DIM as u64;

/// Max tokens fed to the query encoder.
pub const DEFAULT_EMBED_MAX_SEQ_LEN: usize = 512;

/// Literal tag prepended to every query before encoding.
pub const QUERY_PREFIX: &str = "query: ";

/// Literal tag the corpus was embedded with at ingestion time.
pub const PASSAGE_PREFIX: &str = "passage: ";

/// Stage-1 candidate count.
pub const DEFAULT_RETRIEVAL_TOP_K: usize = 15;

/// Final result count after reranking.
pub const DEFAULT_RERANK_TOP_N: usize = 6;

/// Characters of document text used for both rerank input and rerank cache keys.
pub const RERANK_DOC_PREFIX_CHARS: usize = 500;

/// Minimum top rerank score that counts as usable evidence.
pub const LOW_CONFIDENCE_FLOOR: f32 = 0.15;

/// Top scores at or above this are reported as medium confidence.
pub const MEDIUM_CONFIDENCE_THRESHOLD: f32 = 0.20;

/// Top scores at or above this are reported as high confidence.
pub const HIGH_CONFIDENCE_THRESHOLD: f32 = 0.40;

pub const DEFAULT_EMBED_CACHE_CAPACITY: usize = 2048;

pub const DEFAULT_RERANK_CACHE_CAPACITY: usize = 10_000;

pub const DEFAULT_COLLECTION_NAME: &str = "policies";

pub const DEFAULT_EMBED_MODEL_ID: &str = "intfloat/e5-base-v2";

pub const DEFAULT_RERANKER_MODEL_ID: &str = "BAAI/bge-reranker-base";

/// Airline values written by ingestion for non-carrier sources; exempt from the
/// lowercase invariant check.
pub const AIRLINE_SENTINELS: [&str; 2] = ["DOT", "INTERNAL"];

/// Error returned when an encoder output does not match the configured dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// # Example
///
/// ```
/// use waypoint::constants::{validate_embedding_dim, DEFAULT_EMBEDDING_DIM};
///
/// validate_embedding_dim(768, DEFAULT_EMBEDDING_DIM).unwrap();
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if expected == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
