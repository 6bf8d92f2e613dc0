//! Post-ingestion smoke test: one similarity query, results logged.

use std::sync::Arc;

use tracing::{error, info};

use crate::document::ScoredPoint;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Issues sample similarity queries against a collection.
///
/// Purely diagnostic: hits are logged and returned, nothing is asserted.
pub struct Verifier {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    sample_query: String,
    top_k: usize,
}

impl Verifier {
    /// Create a verifier that runs `sample_query` with `top_k` results.
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
        sample_query: impl Into<String>,
        top_k: usize,
    ) -> Self {
        Self { embedding_provider, vector_store, sample_query: sample_query.into(), top_k }
    }

    /// Run the configured sample query against `collection`.
    pub async fn check(&self, collection: &str) -> Result<Vec<ScoredPoint>> {
        self.query(collection, &self.sample_query, self.top_k).await
    }

    /// Embed `text` and return the `limit` nearest points in `collection`.
    pub async fn query(
        &self,
        collection: &str,
        text: &str,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        let vector = self.embedding_provider.embed(text).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            RagError::PipelineError(format!("query embedding failed: {e}"))
        })?;

        let hits = self.vector_store.search(collection, &vector, limit).await.map_err(|e| {
            error!(collection, error = %e, "vector store search failed");
            RagError::PipelineError(format!("search failed in collection '{collection}': {e}"))
        })?;

        info!(collection, query = text, hits = hits.len(), "search results");
        for hit in &hits {
            info!(
                id = hit.point.id,
                score = hit.score,
                file_name = %hit.point.payload.file_name,
                file_path = %hit.point.payload.file_path,
                content = %hit.point.payload.content,
                "hit"
            );
        }

        Ok(hits)
    }
}
