//! Error types for the `mdq-rag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while ingesting or querying Markdown files.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred while loading the encoder or generating an embedding.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A filesystem operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// The path being read or traversed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A Markdown file did not contain valid UTF-8.
    #[error("File is not valid UTF-8: {}", path.display())]
    InvalidUtf8 {
        /// The offending file.
        path: PathBuf,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in the ingestion pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

impl RagError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// A convenience result type for ingestion operations.
pub type Result<T> = std::result::Result<T, RagError>;
