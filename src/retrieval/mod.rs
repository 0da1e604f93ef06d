//! Two-stage evidence retrieval over the policy index.
//!
//! A query is embedded (`query: ` prefix, cached), matched against the index
//! with an optional airline filter, rescored by a cross-encoder (cached per
//! pair, one batched call per search), and trimmed to the citable top-N.
//!
//! ```text
//! search(query, airline)
//!   ├─ attempt(airline)  retrieve ─▶ rerank
//!   ├─ attempt(none)     only if filtered and top score < floor
//!   └─ choose_attempt    unfiltered wins only with a strictly higher score
//! ```

pub mod candidate;
pub mod confidence;
pub mod embedder;
pub mod error;
pub mod fallback;
pub mod reranker;
pub mod retriever;


pub use candidate::{Candidate, top_score};
pub use confidence::{Confidence, ConfidenceThresholds};
pub use embedder::QueryEmbedder;
pub use error::RetrievalError;
pub use fallback::{Attempt, FilterUsed, choose_attempt, should_retry_unfiltered};
pub use reranker::{CrossEncoderReranker, truncate_chars};
pub use retriever::{Retriever, RetrieverConfig, SearchOutcome, WarmupReport};
