//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mdq_rag::{
    CollectionSpec, EmbeddingProvider, InMemoryVectorStore, Point, ScoredPoint, VectorStore,
};

/// Deterministic hash-based embeddings. Only the first `max_tokens`
/// whitespace-separated tokens influence the vector, mimicking an encoder's
/// context window.
pub struct HashEmbeddingProvider {
    dimensions: usize,
    max_tokens: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, max_tokens: usize::MAX }
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> mdq_rag::Result<Vec<f32>> {
        let hash = text
            .split_whitespace()
            .take(self.max_tokens)
            .flat_map(|token| token.bytes().chain(std::iter::once(b' ')))
            .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut emb = vec![0.0f32; self.dimensions];
        for (i, v) in emb.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            emb.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(emb)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        "hash"
    }
}

/// An [`InMemoryVectorStore`] that records every upsert's ids and wait flag.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: InMemoryVectorStore,
    pub upserts: Mutex<Vec<(u64, bool)>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn upserts(&self) -> Vec<(u64, bool)> {
        self.upserts.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorStore for RecordingStore {
    async fn list_collections(&self) -> mdq_rag::Result<Vec<String>> {
        self.inner.list_collections().await
    }

    async fn create_collection(&self, name: &str, spec: &CollectionSpec) -> mdq_rag::Result<()> {
        self.inner.create_collection(name, spec).await
    }

    async fn delete_collection(&self, name: &str) -> mdq_rag::Result<()> {
        self.inner.delete_collection(name).await
    }

    async fn retrieve(&self, collection: &str, ids: &[u64]) -> mdq_rag::Result<Vec<Point>> {
        self.inner.retrieve(collection, ids).await
    }

    async fn upsert(&self, collection: &str, points: &[Point], wait: bool) -> mdq_rag::Result<()> {
        self.upserts.lock().unwrap().extend(points.iter().map(|p| (p.id, wait)));
        self.inner.upsert(collection, points, wait).await
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> mdq_rag::Result<Vec<ScoredPoint>> {
        self.inner.search(collection, vector, limit).await
    }
}
