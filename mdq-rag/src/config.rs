//! Configuration for ingestion runs.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Default Qdrant gRPC endpoint.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Default collection name.
pub const DEFAULT_COLLECTION: &str = "md_files_v3";

/// Default encoder on the Hugging Face hub.
pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Hidden size of [`DEFAULT_MODEL`].
pub const DEFAULT_VECTOR_SIZE: usize = 384;

/// Query issued by the verifier after ingestion.
pub const DEFAULT_VERIFY_QUERY: &str = "Que es un lead";

/// Compute device for the encoder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Run on the CPU.
    #[default]
    Cpu,
    /// Run on the CUDA device with the given ordinal.
    Cuda(usize),
    /// Run on the default Metal device.
    Metal,
}

impl FromStr for Device {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "cpu" => Ok(Self::Cpu),
            "metal" => Ok(Self::Metal),
            "cuda" => Ok(Self::Cuda(0)),
            other => other
                .strip_prefix("cuda:")
                .and_then(|ordinal| ordinal.parse().ok())
                .map(Self::Cuda)
                .ok_or_else(|| {
                    RagError::ConfigError(format!(
                        "unknown device '{s}' (expected cpu, cuda, cuda:N or metal)"
                    ))
                }),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => f.write_str("cpu"),
            Self::Cuda(ordinal) => write!(f, "cuda:{ordinal}"),
            Self::Metal => f.write_str("metal"),
        }
    }
}

/// Everything an ingestion run needs, passed explicitly to each component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestConfig {
    /// Qdrant endpoint URL.
    pub qdrant_url: String,
    /// Qdrant API key, if the server requires one.
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Hub model id or local directory of the encoder.
    pub model: String,
    /// Expected embedding dimensionality.
    pub vector_size: usize,
    /// Root directory scanned for `.md` files.
    pub root_dir: PathBuf,
    /// Store vectors on disk rather than in memory.
    pub on_disk: bool,
    /// Sample query used by the verifier.
    pub verify_query: String,
    /// Number of hits returned by the verifier.
    pub top_k: usize,
    /// Compute device for the encoder.
    pub device: Device,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            api_key: None,
            collection: DEFAULT_COLLECTION.to_string(),
            model: DEFAULT_MODEL.to_string(),
            vector_size: DEFAULT_VECTOR_SIZE,
            root_dir: PathBuf::from("."),
            on_disk: true,
            verify_query: DEFAULT_VERIFY_QUERY.to_string(),
            top_k: 5,
            device: Device::Cpu,
        }
    }
}

impl IngestConfig {
    /// Create a new builder for constructing an [`IngestConfig`].
    pub fn builder() -> IngestConfigBuilder {
        IngestConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`IngestConfig`].
#[derive(Debug, Clone, Default)]
pub struct IngestConfigBuilder {
    config: IngestConfig,
}

impl IngestConfigBuilder {
    /// Set the Qdrant endpoint URL.
    pub fn qdrant_url(mut self, url: impl Into<String>) -> Self {
        self.config.qdrant_url = url.into();
        self
    }

    /// Set the Qdrant API key.
    pub fn api_key(mut self, key: Option<String>) -> Self {
        self.config.api_key = key.filter(|k| !k.is_empty());
        self
    }

    /// Set the target collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.config.collection = name.into();
        self
    }

    /// Set the encoder model id or local directory.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the expected embedding dimensionality.
    pub fn vector_size(mut self, size: usize) -> Self {
        self.config.vector_size = size;
        self
    }

    /// Set the root directory to scan.
    pub fn root_dir(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root_dir = root.into();
        self
    }

    /// Toggle on-disk vector storage.
    pub fn on_disk(mut self, on_disk: bool) -> Self {
        self.config.on_disk = on_disk;
        self
    }

    /// Set the verifier's sample query.
    pub fn verify_query(mut self, query: impl Into<String>) -> Self {
        self.config.verify_query = query.into();
        self
    }

    /// Set the number of verifier hits.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the encoder device.
    pub fn device(mut self, device: Device) -> Self {
        self.config.device = device;
        self
    }

    /// Build the [`IngestConfig`], validating that parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `vector_size == 0`
    /// - `top_k == 0`
    /// - the collection or model name is blank
    pub fn build(self) -> Result<IngestConfig> {
        if self.config.vector_size == 0 {
            return Err(RagError::ConfigError("vector_size must be greater than zero".to_string()));
        }
        if self.config.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if self.config.collection.trim().is_empty() {
            return Err(RagError::ConfigError("collection name must not be empty".to_string()));
        }
        if self.config.model.trim().is_empty() {
            return Err(RagError::ConfigError("model name must not be empty".to_string()));
        }
        Ok(self.config)
    }
}
