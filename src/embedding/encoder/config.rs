use std::path::PathBuf;

use crate::embedding::error::EmbeddingError;

/// Default query encoder output dimension.
pub const ENCODER_EMBEDDING_DIM: usize = crate::constants::DEFAULT_EMBEDDING_DIM;

/// Default query encoder max sequence length.
pub const ENCODER_MAX_SEQ_LEN: usize = crate::constants::DEFAULT_EMBED_MAX_SEQ_LEN;

#[derive(Debug, Clone)]
/// Configuration for [`E5Embedder`](super::E5Embedder).
pub struct EncoderConfig {
    /// Model directory (`config.json`, `model.safetensors`, `tokenizer.json`).
    /// `None` selects the deterministic stub backend.
    pub model_dir: Option<PathBuf>,
    /// Max tokens to consider per input.
    pub max_seq_len: usize,
    /// Expected output embedding dimension.
    pub embedding_dim: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            max_seq_len: ENCODER_MAX_SEQ_LEN,
            embedding_dim: ENCODER_EMBEDDING_DIM,
        }
    }
}

impl EncoderConfig {
    /// Creates a config for a model directory.
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: Some(model_dir.into()),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; produces deterministic embeddings).
    pub fn stub() -> Self {
        Self::default()
    }

    pub fn with_embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.embedding_dim = embedding_dim;
        self
    }

    pub fn is_stub(&self) -> bool {
        self.model_dir.is_none()
    }

    /// Validates sizes and, for a real model, the presence of required files.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.embedding_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding_dim must be > 0".to_string(),
            });
        }

        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be > 0".to_string(),
            });
        }

        let Some(ref dir) = self.model_dir else {
            return Ok(());
        };

        if dir.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_dir cannot be empty when provided".to_string(),
            });
        }

        if !dir.is_dir() {
            return Err(EmbeddingError::ModelNotFound { path: dir.clone() });
        }

        for required in ["config.json", "model.safetensors", "tokenizer.json"] {
            let path = dir.join(required);
            if !path.exists() {
                return Err(EmbeddingError::ModelNotFound { path });
            }
        }

        Ok(())
    }
}
