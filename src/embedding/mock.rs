//! Instrumented in-process models for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::encoder::stub_vector;
use super::error::EmbeddingError;
use super::model::{CrossEncoderModel, EmbeddingModel};
use super::reranker::RerankerError;

/// Deterministic embedding model that records every input it encodes.
pub struct MockEmbeddingModel {
    dim: usize,
    calls: AtomicUsize,
    inputs: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl MockEmbeddingModel {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Number of `encode` invocations.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every string passed to `encode`, in call order.
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().clone()
    }

    /// Makes subsequent `encode` calls fail.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// The vector this model returns for `text`.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        stub_vector(text, self.dim)
    }
}

impl Default for MockEmbeddingModel {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_EMBEDDING_DIM)
    }
}

impl EmbeddingModel for MockEmbeddingModel {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(EmbeddingError::InferenceFailed {
                reason: "mock encoder failure".to_string(),
            });
        }

        self.inputs
            .lock()
            .extend(texts.iter().map(|t| t.to_string()));
        Ok(texts.iter().map(|t| stub_vector(t, self.dim)).collect())
    }
}

/// Cross-encoder returning scripted scores.
///
/// A `(query, document)` score wins over a document-only score; anything
/// unscripted gets `default_score`.
pub struct MockCrossEncoder {
    pair_scores: HashMap<(String, String), f32>,
    scores: HashMap<String, f32>,
    default_score: f32,
    batch_calls: AtomicUsize,
    pairs_scored: AtomicUsize,
    batch_sizes: Mutex<Vec<usize>>,
    fail: AtomicBool,
}

impl MockCrossEncoder {
    pub fn new(default_score: f32) -> Self {
        Self {
            pair_scores: HashMap::new(),
            scores: HashMap::new(),
            default_score,
            batch_calls: AtomicUsize::new(0),
            pairs_scored: AtomicUsize::new(0),
            batch_sizes: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn with_score(mut self, document: impl Into<String>, score: f32) -> Self {
        self.scores.insert(document.into(), score);
        self
    }

    pub fn with_pair_score(
        mut self,
        query: impl Into<String>,
        document: impl Into<String>,
        score: f32,
    ) -> Self {
        self.pair_scores.insert((query.into(), document.into()), score);
        self
    }

    fn score_for(&self, query: &str, document: &str) -> f32 {
        self.pair_scores
            .get(&(query.to_string(), document.to_string()))
            .or_else(|| self.scores.get(document))
            .copied()
            .unwrap_or(self.default_score)
    }

    /// Number of `predict` invocations.
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    /// Total pairs scored across all calls.
    pub fn pairs_scored(&self) -> usize {
        self.pairs_scored.load(Ordering::SeqCst)
    }

    /// Size of each batch, in call order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl CrossEncoderModel for MockCrossEncoder {
    fn predict(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>, RerankerError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(RerankerError::InferenceFailed {
                reason: "mock cross-encoder failure".to_string(),
            });
        }

        self.pairs_scored.fetch_add(pairs.len(), Ordering::SeqCst);
        self.batch_sizes.lock().push(pairs.len());

        Ok(pairs
            .iter()
            .map(|(query, document)| self.score_for(query, document))
            .collect())
    }
}
