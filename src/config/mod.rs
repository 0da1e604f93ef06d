//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `WAYPOINT_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_COLLECTION_NAME, DEFAULT_EMBED_CACHE_CAPACITY, DEFAULT_EMBED_MODEL_ID,
    DEFAULT_RERANK_CACHE_CAPACITY, DEFAULT_RERANK_TOP_N, DEFAULT_RERANKER_MODEL_ID,
    DEFAULT_RETRIEVAL_TOP_K, LOW_CONFIDENCE_FLOOR,
};
use crate::embedding::{EncoderConfig, RerankerConfig};
use crate::retrieval::{ConfidenceThresholds, RetrieverConfig};

/// Retrieval configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `WAYPOINT_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Collection holding the policy chunks. Default: `policies`.
    pub collection: String,

    /// Embedding model directory. `None` runs the deterministic stub encoder.
    pub embed_model_path: Option<PathBuf>,

    /// Reranker model directory. `None` runs the lexical stub reranker.
    pub reranker_path: Option<PathBuf>,

    /// Embedding model identifier (informational; logged at startup).
    pub embed_model_id: String,

    /// Reranker model identifier (informational; logged at startup).
    pub reranker_model_id: String,

    /// Stage-one candidate count. Default: `15`.
    pub retrieval_top_k: usize,

    /// Results kept after reranking. Default: `6`.
    pub rerank_top_n: usize,

    pub embed_cache_capacity: usize,
    pub rerank_cache_capacity: usize,

    /// Minimum top score to answer from evidence; also the fallback trigger.
    pub low_confidence_floor: f32,
}

/// Default Qdrant URL used when `WAYPOINT_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

impl Default for Config {
    fn default() -> Self {
        Self {
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection: DEFAULT_COLLECTION_NAME.to_string(),
            embed_model_path: None,
            reranker_path: None,
            embed_model_id: DEFAULT_EMBED_MODEL_ID.to_string(),
            reranker_model_id: DEFAULT_RERANKER_MODEL_ID.to_string(),
            retrieval_top_k: DEFAULT_RETRIEVAL_TOP_K,
            rerank_top_n: DEFAULT_RERANK_TOP_N,
            embed_cache_capacity: DEFAULT_EMBED_CACHE_CAPACITY,
            rerank_cache_capacity: DEFAULT_RERANK_CACHE_CAPACITY,
            low_confidence_floor: LOW_CONFIDENCE_FLOOR,
        }
    }
}

impl Config {
    const ENV_QDRANT_URL: &'static str = "WAYPOINT_QDRANT_URL";
    const ENV_COLLECTION: &'static str = "WAYPOINT_COLLECTION";
    const ENV_EMBED_MODEL_PATH: &'static str = "WAYPOINT_EMBED_MODEL_PATH";
    const ENV_RERANKER_PATH: &'static str = "WAYPOINT_RERANKER_PATH";
    const ENV_EMBED_MODEL_ID: &'static str = "WAYPOINT_EMBED_MODEL_ID";
    const ENV_RERANKER_MODEL_ID: &'static str = "WAYPOINT_RERANKER_MODEL_ID";
    const ENV_RETRIEVAL_TOP_K: &'static str = "WAYPOINT_RETRIEVAL_TOP_K";
    const ENV_RERANK_TOP_N: &'static str = "WAYPOINT_RERANK_TOP_N";
    const ENV_EMBED_CACHE_CAPACITY: &'static str = "WAYPOINT_EMBED_CACHE_CAPACITY";
    const ENV_RERANK_CACHE_CAPACITY: &'static str = "WAYPOINT_RERANK_CACHE_CAPACITY";
    const ENV_LOW_CONFIDENCE_FLOOR: &'static str = "WAYPOINT_LOW_CONFIDENCE_FLOOR";

    /// Loads configuration from environment variables (falling back to defaults).
    ///
    /// A set-but-malformed number is an error, never silently defaulted.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            qdrant_url: Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url),
            collection: Self::parse_string_from_env(Self::ENV_COLLECTION, defaults.collection),
            embed_model_path: Self::parse_optional_path_from_env(Self::ENV_EMBED_MODEL_PATH),
            reranker_path: Self::parse_optional_path_from_env(Self::ENV_RERANKER_PATH),
            embed_model_id: Self::parse_string_from_env(
                Self::ENV_EMBED_MODEL_ID,
                defaults.embed_model_id,
            ),
            reranker_model_id: Self::parse_string_from_env(
                Self::ENV_RERANKER_MODEL_ID,
                defaults.reranker_model_id,
            ),
            retrieval_top_k: Self::parse_number_from_env(
                Self::ENV_RETRIEVAL_TOP_K,
                defaults.retrieval_top_k,
                "unsigned integer",
            )?,
            rerank_top_n: Self::parse_number_from_env(
                Self::ENV_RERANK_TOP_N,
                defaults.rerank_top_n,
                "unsigned integer",
            )?,
            embed_cache_capacity: Self::parse_number_from_env(
                Self::ENV_EMBED_CACHE_CAPACITY,
                defaults.embed_cache_capacity,
                "unsigned integer",
            )?,
            rerank_cache_capacity: Self::parse_number_from_env(
                Self::ENV_RERANK_CACHE_CAPACITY,
                defaults.rerank_cache_capacity,
                "unsigned integer",
            )?,
            low_confidence_floor: Self::parse_number_from_env(
                Self::ENV_LOW_CONFIDENCE_FLOOR,
                defaults.low_confidence_floor,
                "float",
            )?,
        })
    }

    /// Validates ranges and model paths (does not load anything).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            (Self::ENV_RETRIEVAL_TOP_K, self.retrieval_top_k),
            (Self::ENV_RERANK_TOP_N, self.rerank_top_n),
            (Self::ENV_EMBED_CACHE_CAPACITY, self.embed_cache_capacity),
            (Self::ENV_RERANK_CACHE_CAPACITY, self.rerank_cache_capacity),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigError::OutOfRange {
                    name,
                    reason: "must be greater than 0".to_string(),
                });
            }
        }

        if self.rerank_top_n > self.retrieval_top_k {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_RERANK_TOP_N,
                reason: format!(
                    "{} exceeds retrieval top_k {}",
                    self.rerank_top_n, self.retrieval_top_k
                ),
            });
        }

        if !(0.0..=1.0).contains(&self.low_confidence_floor) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_LOW_CONFIDENCE_FLOOR,
                reason: format!("{} is outside [0, 1]", self.low_confidence_floor),
            });
        }

        if self.collection.trim().is_empty() {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_COLLECTION,
                reason: "cannot be empty".to_string(),
            });
        }

        for path in [&self.embed_model_path, &self.reranker_path]
            .into_iter()
            .flatten()
        {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Settings for the [`Retriever`](crate::retrieval::Retriever).
    pub fn retriever_config(&self) -> RetrieverConfig {
        RetrieverConfig {
            collection: self.collection.clone(),
            top_k: self.retrieval_top_k,
            top_n: self.rerank_top_n,
            thresholds: ConfidenceThresholds::default().with_floor(self.low_confidence_floor),
            embed_cache_capacity: self.embed_cache_capacity,
            rerank_cache_capacity: self.rerank_cache_capacity,
        }
    }

    pub fn encoder_config(&self) -> EncoderConfig {
        match &self.embed_model_path {
            Some(path) => EncoderConfig::new(path),
            None => EncoderConfig::stub(),
        }
    }

    pub fn reranker_config(&self) -> RerankerConfig {
        match &self.reranker_path {
            Some(path) => RerankerConfig::new(path),
            None => RerankerConfig::stub(),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    fn parse_number_from_env<T: FromStr>(
        var_name: &'static str,
        default: T,
        expected: &'static str,
    ) -> Result<T, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                name: var_name,
                value,
                expected,
            }),
            Err(_) => Ok(default),
        }
    }
}
