//! Embedding + model utilities.
//!
//! - [`encoder`] turns query text into unit vectors.
//! - [`reranker`] scores `(query, document)` pairs with a cross-encoder.
//! - [`model`] holds the traits the retrieval pipeline is written against.

/// BERT checkpoints (encoder body + single-logit classifier).
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Query encoder.
pub mod encoder;
mod error;
/// At-most-once deferred model loading.
pub mod lazy;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Model traits.
pub mod model;
/// Cross-encoder reranker.
pub mod reranker;
/// Tokenizer loading and vector helpers.
pub mod utils;

pub use encoder::{E5Embedder, ENCODER_EMBEDDING_DIM, ENCODER_MAX_SEQ_LEN, EncoderConfig};
pub use error::EmbeddingError;
pub use lazy::LazyModel;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCrossEncoder, MockEmbeddingModel};
pub use model::{CrossEncoderModel, EmbeddingModel};
pub use reranker::{Reranker, RerankerConfig, RerankerError};
