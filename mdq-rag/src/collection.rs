//! Collection lifecycle: existence check, delete, create.

use std::sync::Arc;

use tracing::{error, info};

use crate::document::CollectionSpec;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Manages named collections on a [`VectorStore`].
///
/// Creation and deletion are both idempotent: creating an existing
/// collection and deleting a missing one are logged no-ops.
pub struct CollectionManager {
    store: Arc<dyn VectorStore>,
    on_disk: bool,
}

impl CollectionManager {
    /// Create a manager. `on_disk` controls where new collections keep vectors.
    pub fn new(store: Arc<dyn VectorStore>, on_disk: bool) -> Self {
        Self { store, on_disk }
    }

    /// Whether a collection named `name` exists.
    pub async fn exists(&self, name: &str) -> Result<bool> {
        let names = self.store.list_collections().await?;
        Ok(names.iter().any(|n| n == name))
    }

    /// Delete `name` and all of its points. No-op if absent.
    ///
    /// Returns whether a collection was removed.
    pub async fn delete(&self, name: &str) -> Result<bool> {
        if !self.exists(name).await? {
            info!(collection = name, "collection does not exist, nothing to delete");
            return Ok(false);
        }

        self.store.delete_collection(name).await.map_err(|e| {
            error!(collection = name, error = %e, "failed to delete collection");
            RagError::PipelineError(format!("failed to delete collection '{name}': {e}"))
        })?;
        info!(collection = name, "collection deleted");
        Ok(true)
    }

    /// Create an empty cosine collection of `vector_size` dimensions.
    /// No-op if it already exists.
    ///
    /// Returns whether a collection was created.
    pub async fn create(&self, name: &str, vector_size: usize) -> Result<bool> {
        if self.exists(name).await? {
            info!(collection = name, "collection already exists, not creating it again");
            return Ok(false);
        }

        let spec = CollectionSpec { on_disk: self.on_disk, ..CollectionSpec::cosine(vector_size) };
        self.store.create_collection(name, &spec).await.map_err(|e| {
            error!(collection = name, error = %e, "failed to create collection");
            RagError::PipelineError(format!("failed to create collection '{name}': {e}"))
        })?;
        info!(collection = name, vector_size, on_disk = self.on_disk, "collection created");
        Ok(true)
    }

    /// Drop `name` if present, then create it empty.
    pub async fn recreate(&self, name: &str, vector_size: usize) -> Result<()> {
        self.delete(name).await?;
        self.create(name, vector_size).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Point, PointPayload};
    use crate::inmemory::InMemoryVectorStore;

    fn manager() -> (Arc<InMemoryVectorStore>, CollectionManager) {
        let store = Arc::new(InMemoryVectorStore::new());
        let manager = CollectionManager::new(store.clone(), true);
        (store, manager)
    }

    #[tokio::test]
    async fn create_then_exists() {
        let (_, manager) = manager();
        assert!(!manager.exists("docs").await.unwrap());
        assert!(manager.create("docs", 4).await.unwrap());
        assert!(manager.exists("docs").await.unwrap());
        assert!(!manager.create("docs", 4).await.unwrap());
    }

    #[tokio::test]
    async fn delete_missing_is_noop() {
        let (_, manager) = manager();
        assert!(!manager.delete("docs").await.unwrap());
    }

    #[tokio::test]
    async fn recreate_drops_existing_points() {
        let (store, manager) = manager();
        manager.create("docs", 2).await.unwrap();
        let point =
            Point { id: 1, vector: vec![1.0, 0.0], payload: PointPayload::default() };
        store.upsert("docs", &[point], true).await.unwrap();
        assert_eq!(store.point_count("docs").await, Some(1));

        manager.recreate("docs", 2).await.unwrap();
        assert_eq!(store.point_count("docs").await, Some(0));
    }
}
