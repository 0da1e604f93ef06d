use serde::Serialize;

use crate::vectordb::{ChunkMetadata, IndexHit};

/// A chunk under consideration for one search.
///
/// `distance` comes from stage one (lower is closer); `rerank_score` is
/// attached by stage two (higher is more relevant).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
    pub rerank_score: Option<f32>,
}

impl Candidate {
    /// Rerank score, or `0.0` before reranking.
    pub fn score(&self) -> f32 {
        self.rerank_score.unwrap_or(0.0)
    }

    pub fn is_citable(&self) -> bool {
        !self.metadata.do_not_cite
    }
}

impl From<IndexHit> for Candidate {
    fn from(hit: IndexHit) -> Self {
        Self {
            id: hit.id,
            text: hit.text,
            metadata: hit.metadata,
            distance: hit.distance,
            rerank_score: None,
        }
    }
}

/// Best rerank score in an ordered result list, `0.0` when empty.
pub fn top_score(candidates: &[Candidate]) -> f32 {
    candidates.first().map(Candidate::score).unwrap_or(0.0)
}
