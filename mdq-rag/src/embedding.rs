//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that turns text into a fixed-length vector.
///
/// The provider is an expensive, explicitly acquired resource: load it once,
/// share it behind an `Arc`, and drop it at shutdown.
///
/// # Example
///
/// ```rust,ignore
/// use mdq_rag::EmbeddingProvider;
///
/// let provider = CandleEmbeddingProvider::load("sentence-transformers/all-MiniLM-L6-v2", Device::Cpu)?;
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    ///
    /// Identical input must yield identical output for the same weights.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Human-readable model identifier, used in logs.
    fn model_name(&self) -> &str;
}
