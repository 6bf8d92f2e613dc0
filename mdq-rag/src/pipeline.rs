//! Ingestion pipeline orchestrator.
//!
//! The [`IngestPipeline`] walks a directory for Markdown files and, for each
//! one, reads it, derives its point id, embeds its full text, and upserts the
//! resulting point into a collection.
//!
//! # Example
//!
//! ```rust,ignore
//! use mdq_rag::{IngestConfig, IngestPipeline, InMemoryVectorStore};
//!
//! let pipeline = IngestPipeline::builder()
//!     .config(IngestConfig::builder().root_dir("docs").build()?)
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! let report = pipeline.run().await?;
//! println!("{} inserted, {} updated", report.inserted(), report.updated());
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::config::IngestConfig;
use crate::discovery::{discover_markdown_files, read_markdown_file};
use crate::document::{Point, PointPayload};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::identifier::id_for;
use crate::vectorstore::VectorStore;

/// What happened to a single file.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IngestOutcome {
    /// No point with this id existed; the write was not awaited.
    Inserted,
    /// A point with this id existed and was overwritten; the write was awaited.
    Updated,
}

/// Per-file result of an ingestion run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileReport {
    /// The ingested file.
    pub path: PathBuf,
    /// Point id derived from the file name.
    pub id: u64,
    /// Whether the point was new or overwritten.
    pub outcome: IngestOutcome,
}

/// Summary of an ingestion run, in processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// One entry per Markdown file processed.
    pub files: Vec<FileReport>,
}

impl IngestReport {
    /// Number of files processed.
    pub fn processed(&self) -> usize {
        self.files.len()
    }

    /// Number of points written for the first time.
    pub fn inserted(&self) -> usize {
        self.count(IngestOutcome::Inserted)
    }

    /// Number of points overwritten, including same-name collisions within a run.
    pub fn updated(&self) -> usize {
        self.count(IngestOutcome::Updated)
    }

    fn count(&self, outcome: IngestOutcome) -> usize {
        self.files.iter().filter(|f| f.outcome == outcome).count()
    }
}

/// The ingestion pipeline.
///
/// Files are processed strictly one after another; the first failure aborts
/// the run. Construct one via [`IngestPipeline::builder()`].
pub struct IngestPipeline {
    config: IngestConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
}

impl IngestPipeline {
    /// Create a new [`IngestPipelineBuilder`].
    pub fn builder() -> IngestPipelineBuilder {
        IngestPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// Ingest every `.md` file under the configured root directory into the
    /// configured collection.
    ///
    /// # Errors
    ///
    /// Returns the first discovery, read, embedding, or store error. Points
    /// written before the failure stay in the collection.
    pub async fn run(&self) -> Result<IngestReport> {
        let root_dir = &self.config.root_dir;
        let paths = discover_markdown_files(root_dir)?;
        info!(
            count = paths.len(),
            root = %root_dir.display(),
            collection = %self.config.collection,
            "found markdown files"
        );

        let mut report = IngestReport::default();
        for path in &paths {
            report.files.push(self.ingest_file(path).await?);
        }

        info!(
            processed = report.processed(),
            inserted = report.inserted(),
            updated = report.updated(),
            "all markdown files processed"
        );
        Ok(report)
    }

    /// Ingest a single Markdown file: read → id → embed → retrieve → upsert.
    ///
    /// An existing point is overwritten with an acknowledged write; a new
    /// point is written without waiting for acknowledgment.
    pub async fn ingest_file(&self, path: &Path) -> Result<FileReport> {
        let collection = self.config.collection.as_str();
        let file = read_markdown_file(path)?;
        let id = id_for(&file.file_name);

        let vector = self.embedding_provider.embed(&file.content).await.map_err(|e| {
            error!(path = %path.display(), error = %e, "embedding failed during ingestion");
            RagError::PipelineError(format!("embedding failed for '{}': {e}", path.display()))
        })?;

        let point = Point { id, vector, payload: PointPayload::from(&file) };

        let existing = self.vector_store.retrieve(collection, &[id]).await.map_err(|e| {
            error!(path = %path.display(), id, error = %e, "lookup failed during ingestion");
            RagError::PipelineError(format!("lookup failed for '{}': {e}", path.display()))
        })?;

        let outcome =
            if existing.is_empty() { IngestOutcome::Inserted } else { IngestOutcome::Updated };
        let wait = outcome == IngestOutcome::Updated;

        self.vector_store.upsert(collection, std::slice::from_ref(&point), wait).await.map_err(
            |e| {
                error!(path = %path.display(), id, error = %e, "upsert failed during ingestion");
                RagError::PipelineError(format!("upsert failed for '{}': {e}", path.display()))
            },
        )?;

        match outcome {
            IngestOutcome::Updated => info!(path = %path.display(), id, "file updated"),
            IngestOutcome::Inserted => info!(path = %path.display(), id, "file loaded"),
        }

        Ok(FileReport { path: path.to_path_buf(), id, outcome })
    }
}

/// Builder for constructing an [`IngestPipeline`].
///
/// All fields are required. Call [`build()`](IngestPipelineBuilder::build)
/// to validate and produce the pipeline.
#[derive(Default)]
pub struct IngestPipelineBuilder {
    config: Option<IngestConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
}

impl IngestPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: IngestConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Build the [`IngestPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any field is missing or the
    /// provider's dimensionality differs from `config.vector_size`.
    pub fn build(self) -> Result<IngestPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;

        if embedding_provider.dimensions() != config.vector_size {
            return Err(RagError::ConfigError(format!(
                "model '{}' produces {} dimensions but vector_size is {}",
                embedding_provider.model_name(),
                embedding_provider.dimensions(),
                config.vector_size
            )));
        }

        Ok(IngestPipeline { config, embedding_provider, vector_store })
    }
}
