//! BERT-family checkpoints loaded from a Hugging Face style model directory
//! (`config.json` + `model.safetensors`).

use candle::{DType, Device, Result, Tensor};
use candle_core as candle;
use candle_core::IndexOp;
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use std::path::Path;

/// Weight-name prefixes seen in published cross-encoder checkpoints.
const ENCODER_PREFIXES: [&str; 2] = ["bert", "roberta"];

fn read_config(model_dir: &Path) -> Result<Config> {
    let config_content = std::fs::read_to_string(model_dir.join("config.json"))?;
    serde_json::from_str(&config_content)
        .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))
}

fn mmap_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let weights_path = model_dir.join("model.safetensors");
    // SAFETY: the weights file is treated as read-only for the lifetime of the process.
    unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device) }
}

/// Loads a bare BERT encoder (used for query embeddings).
pub fn load_encoder<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<(BertModel, Config)> {
    let model_dir = model_dir.as_ref();
    let config = read_config(model_dir)?;
    let vb = mmap_weights(model_dir, device)?;
    let model = BertModel::load(vb, &config)?;
    Ok((model, config))
}

struct SequenceClassifier {
    bert: BertModel,
    classifier: Linear,
}

impl SequenceClassifier {
    fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let prefix = ENCODER_PREFIXES
            .iter()
            .find(|p| vb.contains_tensor(&format!("{p}.embeddings.word_embeddings.weight")));

        let bert = match prefix {
            Some(p) => BertModel::load(vb.pp(*p), config)?,
            None => BertModel::load(vb.clone(), config)?,
        };

        let classifier = candle_nn::linear(config.hidden_size, 1, vb.pp("classifier"))?;

        Ok(Self { bert, classifier })
    }

    fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        let output = self
            .bert
            .forward(input_ids, token_type_ids, attention_mask)?;
        let cls_token = output.i((.., 0, ..))?;
        self.classifier.forward(&cls_token)
    }
}

/// Single-logit sequence-pair classifier (cross-encoder head on a BERT body).
#[derive(Clone)]
pub struct BertClassifier(std::sync::Arc<SequenceClassifier>);

impl BertClassifier {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let config = read_config(model_dir)?;
        let vb = mmap_weights(model_dir, device)?;
        let model = SequenceClassifier::load(vb, &config)?;

        Ok(Self(std::sync::Arc::new(model)))
    }

    /// Returns raw logits with shape `[batch, 1]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        self.0.forward(input_ids, token_type_ids, attention_mask)
    }
}
