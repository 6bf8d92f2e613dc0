//! Local BERT-family encoder running on [candle](https://docs.rs/candle-core).
//!
//! [`CandleEmbeddingProvider`] resolves `config.json`, `tokenizer.json` and
//! `model.safetensors` through the Hugging Face hub cache (downloading on a
//! miss) or from a local directory, then embeds text by mean pooling the
//! encoder's last hidden state.
//!
//! This module is only available when the `candle` feature is enabled.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use candle_core::{Device as CandleDevice, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use hf_hub::api::sync::Api;
use serde::Deserialize;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::{debug, info};

use crate::config::Device;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

const PROVIDER: &str = "candle";

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// The subset of the encoder's `config.json` needed outside of candle.
#[derive(Debug, Deserialize)]
struct EncoderShape {
    hidden_size: usize,
    max_position_embeddings: usize,
}

/// Paths of the three artifacts an encoder needs.
#[derive(Debug)]
struct ModelFiles {
    config: PathBuf,
    tokenizer: PathBuf,
    weights: PathBuf,
}

/// Token ids for a single input, ready to be turned into tensors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EncodedInput {
    pub ids: Vec<u32>,
    pub type_ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
}

/// An [`EmbeddingProvider`] backed by a BERT encoder loaded into candle.
///
/// # Example
///
/// ```rust,ignore
/// use mdq_rag::{CandleEmbeddingProvider, Device, EmbeddingProvider};
///
/// let provider = CandleEmbeddingProvider::load("sentence-transformers/all-MiniLM-L6-v2", Device::Cpu)?;
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), 384);
/// ```
pub struct CandleEmbeddingProvider {
    model: BertModel,
    tokenizer: Tokenizer,
    device: CandleDevice,
    model_name: String,
    dimensions: usize,
    max_length: usize,
}

impl CandleEmbeddingProvider {
    /// Load tokenizer and encoder for `model`.
    ///
    /// `model` is either a hub id such as `sentence-transformers/all-MiniLM-L6-v2`
    /// or a local directory holding `config.json`, `tokenizer.json` and
    /// `model.safetensors`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the name cannot be resolved, a
    /// file cannot be fetched, or the weights do not match a BERT encoder.
    pub fn load(model: &str, device: Device) -> Result<Self> {
        info!(model, %device, "loading embedding model");
        let files = resolve_model_files(model)?;
        debug!(?files, "resolved model files");

        let config_json = std::fs::read_to_string(&files.config)
            .map_err(|e| RagError::io(&files.config, e))?;
        let bert_config: BertConfig = serde_json::from_str(&config_json)
            .map_err(|e| embed_err(format!("invalid {CONFIG_FILE} for '{model}': {e}")))?;
        let shape: EncoderShape = serde_json::from_str(&config_json)
            .map_err(|e| embed_err(format!("invalid {CONFIG_FILE} for '{model}': {e}")))?;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| embed_err(format!("failed to load tokenizer for '{model}': {e}")))?;
        configure_tokenizer(&mut tokenizer, shape.max_position_embeddings)?;

        let device = candle_device(device)?;
        let weights =
            std::fs::read(&files.weights).map_err(|e| RagError::io(&files.weights, e))?;
        let vb = VarBuilder::from_buffered_safetensors(weights, DTYPE, &device).map_err(candle_err)?;
        let encoder = BertModel::load(vb, &bert_config).map_err(candle_err)?;

        info!(
            model,
            dimensions = shape.hidden_size,
            max_length = shape.max_position_embeddings,
            "embedding model loaded"
        );

        Ok(Self {
            model: encoder,
            tokenizer,
            device,
            model_name: model.to_string(),
            dimensions: shape.hidden_size,
            max_length: shape.max_position_embeddings,
        })
    }

    /// Maximum number of tokens that influence an embedding.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    fn forward(&self, input: &EncodedInput) -> candle_core::Result<Vec<f32>> {
        let ids = Tensor::new(input.ids.as_slice(), &self.device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(input.type_ids.as_slice(), &self.device)?.unsqueeze(0)?;
        let mask = Tensor::new(input.attention_mask.as_slice(), &self.device)?.unsqueeze(0)?;

        let hidden = self.model.forward(&ids, &type_ids, Some(&mask))?;
        mean_pool(&hidden, &mask)?.squeeze(0)?.to_vec1::<f32>()
    }
}

#[async_trait]
impl EmbeddingProvider for CandleEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = encode(&self.tokenizer, text)?;
        debug!(
            provider = PROVIDER,
            text_len = text.len(),
            tokens = input.ids.len(),
            "embedding text"
        );
        if input.ids.is_empty() {
            return Ok(vec![0.0; self.dimensions]);
        }
        self.forward(&input).map_err(candle_err)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

fn resolve_model_files(model: &str) -> Result<ModelFiles> {
    let local = Path::new(model);
    if local.is_dir() {
        let files = ModelFiles {
            config: local.join(CONFIG_FILE),
            tokenizer: local.join(TOKENIZER_FILE),
            weights: local.join(WEIGHTS_FILE),
        };
        for path in [&files.config, &files.tokenizer, &files.weights] {
            if !path.is_file() {
                return Err(embed_err(format!("model file not found: {}", path.display())));
            }
        }
        return Ok(files);
    }

    let api = Api::new().map_err(|e| embed_err(format!("failed to open model hub: {e}")))?;
    let repo = api.model(model.to_string());
    let fetch = |file: &str| {
        repo.get(file)
            .map_err(|e| embed_err(format!("failed to fetch {file} for '{model}': {e}")))
    };

    Ok(ModelFiles {
        config: fetch(CONFIG_FILE)?,
        tokenizer: fetch(TOKENIZER_FILE)?,
        weights: fetch(WEIGHTS_FILE)?,
    })
}

/// Truncate to the encoder's window and pad to the longest sequence.
///
/// Overrides whatever truncation and padding the shipped `tokenizer.json` carries.
pub(crate) fn configure_tokenizer(tokenizer: &mut Tokenizer, max_length: usize) -> Result<()> {
    tokenizer
        .with_truncation(Some(TruncationParams { max_length, ..Default::default() }))
        .map_err(|e| embed_err(format!("failed to configure truncation: {e}")))?;
    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::BatchLongest,
        ..Default::default()
    }));
    Ok(())
}

pub(crate) fn encode(tokenizer: &Tokenizer, text: &str) -> Result<EncodedInput> {
    let encoding = tokenizer
        .encode(text, true)
        .map_err(|e| embed_err(format!("tokenization failed: {e}")))?;
    Ok(EncodedInput {
        ids: encoding.get_ids().to_vec(),
        type_ids: encoding.get_type_ids().to_vec(),
        attention_mask: encoding.get_attention_mask().to_vec(),
    })
}

/// Average `hidden` (`[batch, seq, dim]`) over the sequence axis, counting
/// only positions where `mask` (`[batch, seq]`) is non-zero.
pub(crate) fn mean_pool(hidden: &Tensor, mask: &Tensor) -> candle_core::Result<Tensor> {
    let mask = mask.to_dtype(hidden.dtype())?.unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    let counts = mask.sum(1)?;
    summed.broadcast_div(&counts)
}

fn candle_device(device: Device) -> Result<CandleDevice> {
    match device {
        Device::Cpu => Ok(CandleDevice::Cpu),
        Device::Cuda(ordinal) => CandleDevice::new_cuda(ordinal).map_err(candle_err),
        Device::Metal => CandleDevice::new_metal(0).map_err(candle_err),
    }
}

fn embed_err(message: impl Into<String>) -> RagError {
    RagError::EmbeddingError { provider: PROVIDER.to_string(), message: message.into() }
}

fn candle_err(e: candle_core::Error) -> RagError {
    embed_err(e.to_string())
}
