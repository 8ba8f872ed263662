//! Tenant-scoped vector store operations over Qdrant.
//!
//! Every tenant owns exactly one collection, named deterministically from the
//! tenant id. Collections are created lazily before the first upload and are
//! never destroyed here; deletion only removes points.

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder, DeletePointsBuilder,
    Distance, FieldType, Filter, PointStruct, ScoredPoint, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::VectorStoreError;
use crate::models::{Chunk, SearchResult, VectorStoreConfig};

/// One upload-ready record: a generated point id, the chunk's embedding, and
/// the chunk fields that become the point payload.
#[derive(Debug, Clone)]
pub struct ChunkPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub chunk: Chunk,
}

/// Vector store seam. Implementations must be safe to share across concurrent
/// callers; all operations are scoped to one tenant's collection.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the tenant's collection and payload index if absent. Safe to
    /// call concurrently for the same tenant.
    async fn ensure_collection(&self, tenant_id: i64) -> Result<(), VectorStoreError>;

    /// Upload one batch of embedded chunks in a single call.
    async fn upsert(&self, tenant_id: i64, points: Vec<ChunkPoint>)
    -> Result<(), VectorStoreError>;

    /// Nearest-neighbor search; returns hits in the store's rank order.
    /// An absent collection yields an empty result, not an error.
    async fn search(
        &self,
        tenant_id: i64,
        query_vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<SearchResult>, VectorStoreError>;

    /// Delete all points whose `document_name` payload equals the given
    /// value. A no-op when the collection is absent or nothing matches.
    async fn delete_by_document_name(
        &self,
        tenant_id: i64,
        document_name: &str,
    ) -> Result<(), VectorStoreError>;

    /// Check if the vector store is healthy and accessible.
    async fn health_check(&self) -> Result<bool, VectorStoreError>;
}

/// Qdrant implementation of [`VectorStore`].
pub struct QdrantBackend {
    client: Qdrant,
    embedding_dim: u64,
}

impl QdrantBackend {
    /// Create a backend from configuration with the configured embedding
    /// dimension.
    pub fn new(config: &VectorStoreConfig, embedding_dim: usize) -> Result<Self, VectorStoreError> {
        let client = Qdrant::from_url(&config.url)
            .api_key(config.api_key.clone())
            .build()
            .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            embedding_dim: embedding_dim as u64,
        })
    }

    async fn collection_exists(&self, collection: &str) -> Result<bool, VectorStoreError> {
        self.client
            .collection_exists(collection)
            .await
            .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))
    }
}

/// Deterministic collection name for a tenant.
pub(crate) fn collection_name(tenant_id: i64) -> String {
    format!("tenant_{tenant_id}_documents")
}

/// Whether a create-collection or create-index failure is a lost race against
/// a concurrent creator rather than a real error.
pub(crate) fn is_benign_conflict(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("already exists") || lower.contains("alreadyexists")
}

#[async_trait]
impl VectorStore for QdrantBackend {
    async fn ensure_collection(&self, tenant_id: i64) -> Result<(), VectorStoreError> {
        let collection = collection_name(tenant_id);

        if self.collection_exists(&collection).await? {
            return Ok(());
        }

        let create = CreateCollectionBuilder::new(&collection).vectors_config(
            VectorParamsBuilder::new(self.embedding_dim, Distance::Cosine),
        );

        match self.client.create_collection(create).await {
            Ok(_) => debug!(collection, "created collection"),
            // Lost the check-then-create race: the winner also creates the
            // payload index, so there is nothing left to do.
            Err(e) if is_benign_conflict(&e.to_string()) => {
                warn!(collection, "collection created concurrently");
                return Ok(());
            }
            Err(e) => return Err(VectorStoreError::CollectionError(e.to_string())),
        }

        let index = CreateFieldIndexCollectionBuilder::new(
            &collection,
            "document_name",
            FieldType::Keyword,
        );

        match self.client.create_field_index(index).await {
            Ok(_) => Ok(()),
            Err(e) if is_benign_conflict(&e.to_string()) => Ok(()),
            Err(e) => Err(VectorStoreError::CollectionError(e.to_string())),
        }
    }

    async fn upsert(
        &self,
        tenant_id: i64,
        points: Vec<ChunkPoint>,
    ) -> Result<(), VectorStoreError> {
        if points.is_empty() {
            return Ok(());
        }

        let collection = collection_name(tenant_id);
        let ingested_at = chrono::Utc::now().to_rfc3339();

        let points: Vec<PointStruct> = points
            .into_iter()
            .map(|point| {
                let chunk = point.chunk;
                let mut payload: HashMap<String, qdrant_client::qdrant::Value> = HashMap::new();
                payload.insert("tenant_id".to_string(), chunk.tenant_id.into());
                payload.insert("document_id".to_string(), chunk.document_id.into());
                payload.insert("document_name".to_string(), chunk.document_name.into());
                payload.insert("page".to_string(), i64::from(chunk.page).into());
                payload.insert("content".to_string(), chunk.content.into());
                payload.insert("ingested_at".to_string(), ingested_at.clone().into());

                PointStruct::new(point.id, point.vector, payload)
            })
            .collect();

        let count = points.len();
        let upsert = UpsertPointsBuilder::new(&collection, points);

        self.client
            .upsert_points(upsert)
            .await
            .map_err(|e| VectorStoreError::UpsertError(e.to_string()))?;

        debug!(collection, count, "uploaded points");
        Ok(())
    }

    async fn search(
        &self,
        tenant_id: i64,
        query_vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        let collection = collection_name(tenant_id);

        if !self.collection_exists(&collection).await? {
            debug!(collection, "search against absent collection");
            return Ok(Vec::new());
        }

        let search =
            SearchPointsBuilder::new(&collection, query_vector, limit).with_payload(true);

        let response = self
            .client
            .search_points(search)
            .await
            .map_err(|e| VectorStoreError::SearchError(e.to_string()))?;

        Ok(response.result.into_iter().map(result_from_point).collect())
    }

    async fn delete_by_document_name(
        &self,
        tenant_id: i64,
        document_name: &str,
    ) -> Result<(), VectorStoreError> {
        let collection = collection_name(tenant_id);

        if !self.collection_exists(&collection).await? {
            debug!(collection, "delete against absent collection");
            return Ok(());
        }

        let filter = Filter::must([Condition::matches(
            "document_name",
            document_name.to_string(),
        )]);
        let delete = DeletePointsBuilder::new(&collection).points(filter);

        self.client
            .delete_points(delete)
            .await
            .map_err(|e| VectorStoreError::DeleteError(e.to_string()))?;

        Ok(())
    }

    async fn health_check(&self) -> Result<bool, VectorStoreError> {
        self.client
            .health_check()
            .await
            .map(|_| true)
            .map_err(|e| VectorStoreError::ConnectionError(e.to_string()))
    }
}

/// Project a scored point into the caller-facing result shape. Payload fields
/// written by [`QdrantBackend::upsert`] are expected; anything missing falls
/// back to an empty/zero value rather than failing the whole response.
fn result_from_point(point: ScoredPoint) -> SearchResult {
    let payload = point.payload;

    let content = payload_str(&payload, "content");
    let document_name = payload_str(&payload, "document_name");
    let document_id = payload_i64(&payload, "document_id");
    let page = payload_i64(&payload, "page").max(0) as u32;

    SearchResult {
        score: point.score,
        content,
        document_name,
        document_id,
        page,
    }
}

fn payload_str(payload: &HashMap<String, qdrant_client::qdrant::Value>, key: &str) -> String {
    payload
        .get(key)
        .and_then(|v| match &v.kind {
            Some(qdrant_client::qdrant::value::Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

fn payload_i64(payload: &HashMap<String, qdrant_client::qdrant::Value>, key: &str) -> i64 {
    payload
        .get(key)
        .and_then(|v| match &v.kind {
            Some(qdrant_client::qdrant::value::Kind::IntegerValue(n)) => Some(*n),
            _ => None,
        })
        .unwrap_or_default()
}
