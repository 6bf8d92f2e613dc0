//! Qdrant vector store backend.
//!
//! Provides [`QdrantVectorStore`] which implements [`VectorStore`] using
//! the [qdrant-client](https://docs.rs/qdrant-client) crate over gRPC.
//!
//! # Example
//!
//! ```rust,ignore
//! use mdq_rag::qdrant::QdrantVectorStore;
//!
//! let store = QdrantVectorStore::new("http://localhost:6334", Some("api-key"))?;
//! store.create_collection("docs", &CollectionSpec::cosine(384)).await?;
//! store.upsert("docs", &points, true).await?;
//! let hits = store.search("docs", &query_embedding, 5).await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance as QdrantDistance, GetPointsBuilder, PointId, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::debug;

use crate::document::{CollectionSpec, Distance, Point, PointPayload, ScoredPoint};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// A [`VectorStore`] backed by [Qdrant](https://qdrant.tech/).
///
/// Wraps a [`qdrant_client::Qdrant`] client. Point payloads carry the
/// `file_name`, `file_path` and `content` string fields.
pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    /// Create a new Qdrant vector store connecting to the given URL.
    pub fn new(url: &str, api_key: Option<&str>) -> Result<Self> {
        let mut config = Qdrant::from_url(url);
        if let Some(key) = api_key {
            config = config.api_key(key.to_string());
        }
        let client = config.build().map_err(Self::map_err)?;
        Ok(Self { client })
    }

    /// Create a new Qdrant vector store from an existing client.
    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn map_err(e: qdrant_client::QdrantError) -> RagError {
        RagError::VectorStoreError { backend: "qdrant".to_string(), message: e.to_string() }
    }
}

fn distance(distance: Distance) -> QdrantDistance {
    match distance {
        Distance::Cosine => QdrantDistance::Cosine,
    }
}

fn point_struct(point: &Point) -> Result<PointStruct> {
    let payload = serde_json::to_value(&point.payload).map_err(|e| RagError::VectorStoreError {
        backend: "qdrant".to_string(),
        message: format!("failed to encode payload of point {}: {e}", point.id),
    })?;
    let payload = Payload::try_from(payload).map_err(QdrantVectorStore::map_err)?;
    Ok(PointStruct::new(point.id, point.vector.clone(), payload))
}

/// Points are always written with numeric ids; anything else is a foreign point.
fn numeric_id(id: Option<&PointId>) -> Result<u64> {
    match id.and_then(|pid| pid.point_id_options.as_ref()) {
        Some(PointIdOptions::Num(n)) => Ok(*n),
        Some(PointIdOptions::Uuid(uuid)) => Err(RagError::VectorStoreError {
            backend: "qdrant".to_string(),
            message: format!("expected a numeric point id, got uuid '{uuid}'"),
        }),
        None => Err(RagError::VectorStoreError {
            backend: "qdrant".to_string(),
            message: "point returned without an id".to_string(),
        }),
    }
}

/// Extract a string from a Qdrant payload value.
fn extract_string(value: &QdrantValue) -> Option<String> {
    match &value.kind {
        Some(Kind::StringValue(s)) => Some(s.clone()),
        _ => None,
    }
}

fn decode_payload(payload: &HashMap<String, QdrantValue>) -> PointPayload {
    let field = |key: &str| payload.get(key).and_then(extract_string).unwrap_or_default();
    PointPayload {
        file_name: field("file_name"),
        file_path: field("file_path"),
        content: field("content"),
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn list_collections(&self) -> Result<Vec<String>> {
        let response = self.client.list_collections().await.map_err(Self::map_err)?;
        Ok(response.collections.into_iter().map(|c| c.name).collect())
    }

    async fn create_collection(&self, name: &str, spec: &CollectionSpec) -> Result<()> {
        self.client
            .create_collection(
                CreateCollectionBuilder::new(name).vectors_config(
                    VectorParamsBuilder::new(spec.dimensions as u64, distance(spec.distance))
                        .on_disk(spec.on_disk),
                ),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(
            collection = name,
            dimensions = spec.dimensions,
            on_disk = spec.on_disk,
            "created qdrant collection"
        );
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.client.delete_collection(name).await.map_err(Self::map_err)?;
        debug!(collection = name, "deleted qdrant collection");
        Ok(())
    }

    async fn retrieve(&self, collection: &str, ids: &[u64]) -> Result<Vec<Point>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let point_ids: Vec<PointId> = ids.iter().map(|id| PointId::from(*id)).collect();
        let response = self
            .client
            .get_points(GetPointsBuilder::new(collection, point_ids).with_payload(true))
            .await
            .map_err(Self::map_err)?;

        debug!(
            collection,
            requested = ids.len(),
            found = response.result.len(),
            "retrieved points from qdrant"
        );

        response
            .result
            .into_iter()
            .map(|retrieved| {
                Ok(Point {
                    id: numeric_id(retrieved.id.as_ref())?,
                    vector: vec![],
                    payload: decode_payload(&retrieved.payload),
                })
            })
            .collect()
    }

    async fn upsert(&self, collection: &str, points: &[Point], wait: bool) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let structs = points.iter().map(point_struct).collect::<Result<Vec<_>>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, structs).wait(wait))
            .await
            .map_err(Self::map_err)?;

        debug!(collection, count = points.len(), wait, "upserted points to qdrant");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, vector.to_vec(), limit as u64)
                    .with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        response
            .result
            .into_iter()
            .map(|scored| {
                Ok(ScoredPoint {
                    point: Point {
                        id: numeric_id(scored.id.as_ref())?,
                        vector: vec![],
                        payload: decode_payload(&scored.payload),
                    },
                    score: scored.score,
                })
            })
            .collect()
    }
}
