//! Data types for Markdown files, points, and search results.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A Markdown file read from disk, before embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownFile {
    /// Path as discovered under the ingestion root.
    pub path: PathBuf,
    /// Base file name, e.g. `notes.md`.
    pub file_name: String,
    /// Full UTF-8 text of the file.
    pub content: String,
}

/// Metadata stored next to each vector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PointPayload {
    /// Base file name of the source file.
    pub file_name: String,
    /// Path of the source file as seen during ingestion.
    pub file_path: String,
    /// Full text of the source file.
    pub content: String,
}

impl From<&MarkdownFile> for PointPayload {
    fn from(file: &MarkdownFile) -> Self {
        Self {
            file_name: file.file_name.clone(),
            file_path: file.path.display().to_string(),
            content: file.content.clone(),
        }
    }
}

/// The unit stored in a collection: identifier, vector, and payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Point {
    /// Identifier derived from the file name.
    pub id: u64,
    /// Embedding of the file content. May be empty when a backend
    /// does not return vectors on retrieval.
    pub vector: Vec<f32>,
    /// File metadata.
    pub payload: PointPayload,
}

/// A retrieved [`Point`] paired with a similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPoint {
    /// The matching point.
    pub point: Point,
    /// The similarity score (higher is more similar).
    pub score: f32,
}

/// Similarity metric used by a collection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    /// Angle-based similarity, invariant to magnitude.
    #[default]
    Cosine,
}

/// Parameters a collection is provisioned with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionSpec {
    /// Vector dimensionality shared by every point.
    pub dimensions: usize,
    /// Similarity metric.
    pub distance: Distance,
    /// Keep vectors on disk instead of in RAM.
    pub on_disk: bool,
}

impl CollectionSpec {
    /// Cosine collection with on-disk vectors.
    pub fn cosine(dimensions: usize) -> Self {
        Self { dimensions, distance: Distance::Cosine, on_disk: true }
    }
}
