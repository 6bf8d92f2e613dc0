//! Markdown ingestion into a vector database.
//!
//! This crate provides:
//! - Recursive `.md` discovery and UTF-8 reading
//! - Whole-file embeddings from a local BERT encoder (`candle` feature)
//! - Stable point ids derived from file names
//! - Collection lifecycle management and point upserts over a [`VectorStore`]
//!   (Qdrant with the `qdrant` feature, or in memory)
//! - A post-ingestion verification query

pub mod collection;
pub mod config;
pub mod discovery;
pub mod document;
pub mod embedding;
pub mod error;
pub mod identifier;
pub mod inmemory;
pub mod pipeline;
pub mod vectorstore;
pub mod verify;

#[cfg(feature = "candle")]
pub mod candle;
#[cfg(feature = "qdrant")]
pub mod qdrant;

pub use collection::CollectionManager;
pub use config::{Device, IngestConfig, IngestConfigBuilder};
pub use discovery::{discover_markdown_files, read_markdown_file};
pub use document::{CollectionSpec, Distance, MarkdownFile, Point, PointPayload, ScoredPoint};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use identifier::id_for;
pub use inmemory::InMemoryVectorStore;
pub use pipeline::{FileReport, IngestOutcome, IngestPipeline, IngestPipelineBuilder, IngestReport};
pub use vectorstore::VectorStore;
pub use verify::Verifier;

#[cfg(feature = "candle")]
pub use crate::candle::CandleEmbeddingProvider;
#[cfg(feature = "qdrant")]
pub use crate::qdrant::QdrantVectorStore;
