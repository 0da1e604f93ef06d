pub mod config;
pub mod error;


pub use config::{MAX_SEQ_LEN, RerankerConfig};
pub use error::RerankerError;

use std::collections::HashSet;

use crate::embedding::bert::BertClassifier;
use candle_core::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::embedding::device::select_device;
use crate::embedding::model::CrossEncoderModel;
use crate::embedding::utils::{load_batch_tokenizer, stack_rows};

/// Cross-encoder relevance scorer.
///
/// Scores are the sigmoid of the classifier logit, so they fall in `[0, 1]` and
/// are comparable with the confidence thresholds in [`crate::constants`].
pub struct Reranker {
    device: candle_core::Device,
    config: RerankerConfig,
    model: Option<BertClassifier>,
    tokenizer: Option<Tokenizer>,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("device", &format!("{:?}", self.device))
            .field("config", &self.config)
            .field("model_loaded", &self.is_model_loaded())
            .finish()
    }
}

impl Reranker {
    pub fn load(config: RerankerConfig) -> Result<Self, RerankerError> {
        if let Err(msg) = config.validate() {
            return Err(RerankerError::InvalidConfig { reason: msg });
        }

        let device = select_device()?;
        debug!(?device, "Selected compute device for reranker");

        let Some(ref model_path) = config.model_path else {
            info!("No reranker model path configured, operating in stub mode");
            return Ok(Self {
                device,
                config,
                model: None,
                tokenizer: None,
            });
        };

        if !model_path.exists() {
            return Err(RerankerError::ModelNotFound {
                path: model_path.clone(),
            });
        }

        for required in ["config.json", "model.safetensors", "tokenizer.json"] {
            if !model_path.join(required).exists() {
                return Err(RerankerError::ModelLoadFailed {
                    reason: format!("Missing {} in {}", required, model_path.display()),
                });
            }
        }

        info!(model_path = %model_path.display(), "Loading reranker model");

        let model = BertClassifier::load(model_path, &device).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("Failed to load BERT classifier: {}", e),
            }
        })?;

        let tokenizer = load_batch_tokenizer(model_path, config.max_seq_len).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        info!(max_seq_len = config.max_seq_len, "Reranker model loaded");

        Ok(Self {
            device,
            config,
            model: Some(model),
            tokenizer: Some(tokenizer),
        })
    }

    pub fn stub() -> Result<Self, RerankerError> {
        Self::load(RerankerConfig::stub())
    }

    /// Scores a batch of `(query, document)` pairs in a single forward pass.
    pub fn score_batch(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>, RerankerError> {
        if pairs.is_empty() {
            return Ok(vec![]);
        }

        debug!(
            pairs = pairs.len(),
            model_loaded = self.is_model_loaded(),
            "Scoring query-document batch"
        );

        let (Some(model), Some(tokenizer)) = (&self.model, &self.tokenizer) else {
            return Ok(pairs
                .iter()
                .map(|(query, document)| placeholder_score(query, document))
                .collect());
        };

        let encodings = tokenizer.encode_batch(pairs.to_vec(), true).map_err(|e| {
            RerankerError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;

        let (ids, batch, seq_len) = stack_rows(encodings.iter().map(|e| e.get_ids()));
        let (type_ids, _, _) = stack_rows(encodings.iter().map(|e| e.get_type_ids()));
        // The tokenizer's mask zeroes padding positions in shorter pairs.
        let (mask, _, _) = stack_rows(encodings.iter().map(|e| e.get_attention_mask()));

        let token_ids = Tensor::from_vec(ids, (batch, seq_len), &self.device)?;
        let type_ids = Tensor::from_vec(type_ids, (batch, seq_len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask, (batch, seq_len), &self.device)?;

        let logits = model
            .forward(&token_ids, &type_ids, Some(&attention_mask))
            .map_err(|e| RerankerError::InferenceFailed {
                reason: e.to_string(),
            })?;

        let scores: Vec<f32> = logits
            .flatten_all()?
            .to_vec1::<f32>()?
            .into_iter()
            .map(sigmoid)
            .collect();

        if scores.len() != pairs.len() {
            return Err(RerankerError::ScoreCountMismatch {
                expected: pairs.len(),
                actual: scores.len(),
            });
        }

        Ok(scores)
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }

    pub fn device(&self) -> &candle_core::Device {
        &self.device
    }
}

impl CrossEncoderModel for Reranker {
    fn predict(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>, RerankerError> {
        self.score_batch(pairs)
    }
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

const STOP_WORDS: [&str; 95] = [
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
    "can", "need", "dare", "ought", "used", "to", "of", "in", "for", "on", "with", "at", "by",
    "from", "as", "into", "through", "during", "before", "after", "above", "below", "between",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why", "how",
    "all", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not", "only",
    "own", "same", "so", "than", "too", "very", "just", "and", "but", "if", "or", "because",
    "until", "while", "what", "which", "who", "whom", "this", "that", "these", "those", "am",
    "it", "its",
];

fn content_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Lexical-overlap score used when no model is configured (deterministic, `[0, 1]`).
pub(crate) fn placeholder_score(query: &str, document: &str) -> f32 {
    let query_words = content_words(query);
    let document_words = content_words(document);

    if query_words.is_empty() {
        let len_ratio = (query.len().min(document.len()) as f32)
            / (query.len().max(document.len()).max(1) as f32);
        return len_ratio * 0.3;
    }

    let matches = query_words.intersection(&document_words).count();
    let recall = matches as f32 / query_words.len() as f32;

    let union = query_words.union(&document_words).count();
    let jaccard = if union > 0 {
        matches as f32 / union as f32
    } else {
        0.0
    };

    let base_score = 0.6 * recall + 0.4 * jaccard;

    sigmoid(8.0 * (base_score - 0.5)).clamp(0.0, 1.0)
}
