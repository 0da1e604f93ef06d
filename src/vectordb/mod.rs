//! Policy chunk index (Qdrant) and store inspection.

pub mod client;
pub mod error;
pub mod inspect;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;


pub use client::{QdrantIndex, VectorIndex};
pub use error::VectorDbError;
pub use inspect::{DEFAULT_SAMPLE_SIZE, StoreReport, inspect_store};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockVectorIndex, cosine_similarity};
pub use model::{
    ChunkMetadata, DocumentChunk, IndexHit, StoredChunk, normalize_airline, point_id_for_chunk,
};

pub const DEFAULT_VECTOR_SIZE: u64 = crate::constants::DEFAULT_VECTOR_SIZE_U64;
