//! E5-style query encoder (BERT body, masked mean pooling, L2 normalization).
//!
//! Use [`EncoderConfig::stub`] for tests/examples without model files.

/// Encoder configuration.
pub mod config;


pub use config::{ENCODER_EMBEDDING_DIM, ENCODER_MAX_SEQ_LEN, EncoderConfig};

use candle_core::{DType, Device, Tensor};
use candle_transformers::models::bert::BertModel;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::constants::validate_embedding_dim;
use crate::embedding::bert::load_encoder;
use crate::embedding::device::select_device;
use crate::embedding::error::EmbeddingError;
use crate::embedding::model::EmbeddingModel;
use crate::embedding::utils::{load_batch_tokenizer, normalize_l2, stack_rows};

enum EncoderBackend {
    Model {
        model: BertModel,
        tokenizer: Tokenizer,
        device: Device,
    },
    Stub,
}

/// Dense encoder for query text (supports stub mode).
pub struct E5Embedder {
    backend: EncoderBackend,
    config: EncoderConfig,
}

impl std::fmt::Debug for E5Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("E5Embedder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EncoderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.config.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl E5Embedder {
    /// Loads the encoder from a config (stub mode when no model directory is set).
    pub fn load(config: EncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let Some(model_dir) = config.model_dir.clone() else {
            warn!("Query encoder running in STUB mode (no model directory configured)");
            return Ok(Self {
                backend: EncoderBackend::Stub,
                config,
            });
        };

        let device = select_device()?;
        debug!(?device, "Selected compute device for query encoder");

        let tokenizer = load_batch_tokenizer(&model_dir, config.max_seq_len).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        let (model, bert_config) =
            load_encoder(&model_dir, &device).map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT encoder: {}", e),
            })?;

        if config.embedding_dim != bert_config.hidden_size {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "embedding_dim ({}) does not match model hidden_size ({})",
                    config.embedding_dim, bert_config.hidden_size
                ),
            });
        }

        info!(
            model_dir = %model_dir.display(),
            embedding_dim = config.embedding_dim,
            max_seq_len = config.max_seq_len,
            num_layers = bert_config.num_hidden_layers,
            "Query encoder loaded"
        );

        Ok(Self {
            backend: EncoderBackend::Model {
                model,
                tokenizer,
                device,
            },
            config,
        })
    }

    pub fn stub() -> Result<Self, EmbeddingError> {
        Self::load(EncoderConfig::stub())
    }

    /// Encodes a batch of strings into unit-length vectors.
    pub fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        match &self.backend {
            EncoderBackend::Model {
                model,
                tokenizer,
                device,
            } => self.encode_with_model(texts, model, tokenizer, device),
            EncoderBackend::Stub => Ok(texts
                .iter()
                .map(|text| stub_vector(text, self.config.embedding_dim))
                .collect()),
        }
    }

    fn encode_with_model(
        &self,
        texts: &[&str],
        model: &BertModel,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let encodings = tokenizer.encode_batch(texts.to_vec(), true).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;

        let (ids, batch, seq_len) = stack_rows(encodings.iter().map(|e| e.get_ids()));
        let (type_ids, _, _) = stack_rows(encodings.iter().map(|e| e.get_type_ids()));
        let (mask, _, _) = stack_rows(encodings.iter().map(|e| e.get_attention_mask()));

        debug!(batch, seq_len, "Encoding query batch (transformer forward pass)");

        let input_ids = Tensor::from_vec(ids, (batch, seq_len), device)?;
        let token_type_ids = Tensor::from_vec(type_ids, (batch, seq_len), device)?;
        let attention_mask = Tensor::from_vec(mask, (batch, seq_len), device)?;

        // hidden: [batch, seq_len, hidden]
        let hidden = model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        // Mean over attended tokens only; padding positions carry a zero mask.
        let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?;
        let pooled = summed.broadcast_div(&counts)?;

        let mut vectors = pooled.to_vec2::<f32>()?;
        for vector in &mut vectors {
            validate_embedding_dim(vector.len(), self.config.embedding_dim)?;
            normalize_l2(vector);
        }

        Ok(vectors)
    }

    /// Returns the configured output embedding dimension.
    pub fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub)
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

impl EmbeddingModel for E5Embedder {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.encode_batch(texts)
    }
}

/// Deterministic pseudo-embedding seeded from the text (unit length).
pub(crate) fn stub_vector(text: &str, dim: usize) -> Vec<f32> {
    let hash = blake3::hash(text.as_bytes());
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&hash.as_bytes()[..8]);
    let mut state = u64::from_le_bytes(seed_bytes);

    let mut vector = Vec::with_capacity(dim);
    for _ in 0..dim {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
        vector.push(value);
    }

    normalize_l2(&mut vector);
    vector
}
