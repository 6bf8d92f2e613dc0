//! Vector store trait: the collection and point operations the pipeline needs.

use async_trait::async_trait;

use crate::document::{CollectionSpec, Point, ScoredPoint};
use crate::error::Result;

/// A storage backend for points with similarity search.
///
/// This is the only channel through which the pipeline, the collection
/// manager and the verifier talk to the database, so tests can substitute
/// [`InMemoryVectorStore`](crate::InMemoryVectorStore) for a live server.
///
/// # Example
///
/// ```rust,ignore
/// use mdq_rag::{CollectionSpec, InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("docs", &CollectionSpec::cosine(384)).await?;
/// store.upsert("docs", &points, true).await?;
/// let hits = store.search("docs", &query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Names of all collections known to the backend.
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Provision an empty collection.
    async fn create_collection(&self, name: &str, spec: &CollectionSpec) -> Result<()>;

    /// Delete a collection and all of its points.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Fetch the points with the given ids. Missing ids are skipped.
    async fn retrieve(&self, collection: &str, ids: &[u64]) -> Result<Vec<Point>>;

    /// Insert or overwrite points keyed by id.
    ///
    /// With `wait` set, returns only once the backend has applied the write.
    async fn upsert(&self, collection: &str, points: &[Point], wait: bool) -> Result<()>;

    /// Search for the `limit` points most similar to `vector`.
    ///
    /// Returns results ordered by descending similarity score.
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>>;
}
