//! Document index: the single ingest/retrieval/deletion component.
//!
//! One `DocumentIndex` is constructed per process from validated
//! configuration and shared across all tenants; every operation is
//! parameterized by tenant id. The embedder and store handles are the only
//! shared state, and both are read-only, so calls for different tenants run
//! concurrently without coordination.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{DeleteError, IngestError, InitError, SearchError};
use crate::models::{Chunk, Config, SearchResult};
use crate::services::batch::partition_chunks;
use crate::services::embedding::{Embedder, EmbeddingClient};
use crate::services::vector_store::{QdrantBackend, VectorStore};

/// Outcome of a completed ingestion call.
#[derive(Debug, Clone, Copy)]
pub struct IngestReport {
    pub chunks: usize,
    pub batches: usize,
}

pub struct DocumentIndex {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    batch_size: usize,
}

impl DocumentIndex {
    /// Build the process-wide index from validated configuration,
    /// constructing the embedding and vector store handles.
    pub fn from_config(config: &Config) -> Result<Self, InitError> {
        let embedder = EmbeddingClient::new(&config.embedding)?;
        let store = QdrantBackend::new(&config.vector_store, config.embedding.dimension)?;

        Ok(Self::new(
            Arc::new(embedder),
            Arc::new(store),
            config.ingest.batch_size,
        ))
    }

    /// Assemble an index from existing collaborator handles.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        batch_size: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            batch_size,
        }
    }

    /// Create the tenant's collection and payload index if absent.
    pub async fn ensure_collection(&self, tenant_id: i64) -> Result<(), IngestError> {
        self.store
            .ensure_collection(tenant_id)
            .await
            .map_err(|source| IngestError::Collection { tenant_id, source })
    }

    /// Embed and upload a tenant's chunks.
    ///
    /// Batches are processed strictly in sequence: one embedding call and one
    /// upload call per batch. The first failing batch aborts the remainder;
    /// batches uploaded before the failure stay in the store, so recovering
    /// callers should delete the document before re-ingesting.
    pub async fn ingest(
        &self,
        tenant_id: i64,
        chunks: Vec<Chunk>,
    ) -> Result<IngestReport, IngestError> {
        let chunk_count = chunks.len();
        if chunk_count == 0 {
            return Ok(IngestReport {
                chunks: 0,
                batches: 0,
            });
        }

        self.ensure_collection(tenant_id).await?;

        let batches = partition_chunks(chunks, self.batch_size);
        let batch_count = batches.len();

        for (uploaded, batch) in batches.into_iter().enumerate() {
            let batch_index = uploaded + 1;
            let batch_len = batch.len();

            let vectors = self
                .embedder
                .embed_documents(batch.contents())
                .await
                .map_err(|source| IngestError::Embedding {
                    tenant_id,
                    batch_index,
                    batch_count,
                    batches_uploaded: uploaded,
                    source,
                })?;

            let points = batch.into_points(vectors);

            self.store
                .upsert(tenant_id, points)
                .await
                .map_err(|source| IngestError::Upload {
                    tenant_id,
                    batch_index,
                    batch_count,
                    batches_uploaded: uploaded,
                    source,
                })?;

            debug!(
                tenant_id,
                batch_index, batch_count, batch_len, "batch uploaded"
            );
        }

        info!(tenant_id, chunk_count, batch_count, "ingest complete");
        Ok(IngestReport {
            chunks: chunk_count,
            batches: batch_count,
        })
    }

    /// Embed a query and return the tenant's `top_k` nearest chunks in the
    /// store's rank order. An absent or empty collection yields an empty
    /// result.
    pub async fn search(
        &self,
        tenant_id: i64,
        query: &str,
        top_k: u64,
    ) -> Result<Vec<SearchResult>, SearchError> {
        if top_k == 0 {
            return Err(SearchError::InvalidQuery(
                "top_k must be a positive integer".to_string(),
            ));
        }
        if query.trim().is_empty() {
            return Err(SearchError::InvalidQuery("query is empty".to_string()));
        }

        let vector = self
            .embedder
            .embed_query(query)
            .await
            .map_err(|source| SearchError::Embedding { tenant_id, source })?;

        let results = self
            .store
            .search(tenant_id, vector, top_k)
            .await
            .map_err(|source| SearchError::VectorStore { tenant_id, source })?;

        debug!(tenant_id, hits = results.len(), "search complete");
        Ok(results)
    }

    /// Remove every point of the named document from the tenant's collection.
    /// Idempotent; deleting a never-ingested name succeeds silently.
    pub async fn delete_document(
        &self,
        tenant_id: i64,
        document_name: &str,
    ) -> Result<(), DeleteError> {
        self.store
            .delete_by_document_name(tenant_id, document_name)
            .await
            .map_err(|source| DeleteError::VectorStore {
                tenant_id,
                document_name: document_name.to_string(),
                source,
            })?;

        info!(tenant_id, document_name, "document deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use crate::error::{EmbeddingError, VectorStoreError};
    use crate::services::vector_store::ChunkPoint;

    const DIM: usize = 4;

    /// Records the size of every embedding call; optionally fails on a
    /// configured call number (1-based).
    struct ScriptedEmbedder {
        calls: Mutex<Vec<usize>>,
        fail_on_call: Option<usize>,
    }

    impl ScriptedEmbedder {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on_call: None,
            }
        }

        fn failing_on(call: usize) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on_call: Some(call),
            }
        }

        fn call_sizes(&self) -> Vec<usize> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Embedder for ScriptedEmbedder {
        async fn embed_documents(
            &self,
            texts: Vec<String>,
        ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            let call_number = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(texts.len());
                calls.len()
            };

            if self.fail_on_call == Some(call_number) {
                return Err(EmbeddingError::Timeout);
            }

            Ok(texts.iter().map(|_| vec![0.5; DIM]).collect())
        }

        async fn embed_query(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.calls.lock().unwrap().push(1);
            Ok(vec![0.5; DIM])
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        ensured: Mutex<Vec<i64>>,
        upserts: Mutex<Vec<(i64, Vec<ChunkPoint>)>>,
        deletes: Mutex<Vec<(i64, String)>>,
        searches: Mutex<Vec<(i64, u64)>>,
        search_results: Mutex<Vec<SearchResult>>,
    }

    #[async_trait]
    impl VectorStore for RecordingStore {
        async fn ensure_collection(&self, tenant_id: i64) -> Result<(), VectorStoreError> {
            self.ensured.lock().unwrap().push(tenant_id);
            Ok(())
        }

        async fn upsert(
            &self,
            tenant_id: i64,
            points: Vec<ChunkPoint>,
        ) -> Result<(), VectorStoreError> {
            self.upserts.lock().unwrap().push((tenant_id, points));
            Ok(())
        }

        async fn search(
            &self,
            tenant_id: i64,
            _query_vector: Vec<f32>,
            limit: u64,
        ) -> Result<Vec<SearchResult>, VectorStoreError> {
            self.searches.lock().unwrap().push((tenant_id, limit));
            Ok(self.search_results.lock().unwrap().clone())
        }

        async fn delete_by_document_name(
            &self,
            tenant_id: i64,
            document_name: &str,
        ) -> Result<(), VectorStoreError> {
            self.deletes
                .lock()
                .unwrap()
                .push((tenant_id, document_name.to_string()));
            Ok(())
        }

        async fn health_check(&self) -> Result<bool, VectorStoreError> {
            Ok(true)
        }
    }

    fn chunks(n: usize) -> Vec<Chunk> {
        (0..n)
            .map(|i| Chunk::new(7, 42, "doc.pdf", 1, format!("chunk {i}")))
            .collect()
    }

    fn index(
        embedder: Arc<ScriptedEmbedder>,
        store: Arc<RecordingStore>,
        batch_size: usize,
    ) -> DocumentIndex {
        DocumentIndex::new(embedder, store, batch_size)
    }

    #[tokio::test]
    async fn test_ingest_batches_embedding_and_upload_calls() {
        let embedder = Arc::new(ScriptedEmbedder::new());
        let store = Arc::new(RecordingStore::default());
        let idx = index(embedder.clone(), store.clone(), 100);

        let report = idx.ingest(7, chunks(250)).await.unwrap();
        assert_eq!(report.chunks, 250);
        assert_eq!(report.batches, 3);

        // Exactly one embedding call and one upload call per batch.
        assert_eq!(embedder.call_sizes(), vec![100, 100, 50]);
        let upserts = store.upserts.lock().unwrap();
        let sizes: Vec<usize> = upserts.iter().map(|(_, p)| p.len()).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert!(upserts.iter().all(|(tenant, _)| *tenant == 7));
    }

    #[tokio::test]
    async fn test_ingest_ensures_collection_before_upload() {
        let store = Arc::new(RecordingStore::default());
        let idx = index(Arc::new(ScriptedEmbedder::new()), store.clone(), 10);

        idx.ingest(3, chunks(5)).await.unwrap();
        assert_eq!(*store.ensured.lock().unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn test_ingest_empty_performs_no_store_calls() {
        let embedder = Arc::new(ScriptedEmbedder::new());
        let store = Arc::new(RecordingStore::default());
        let idx = index(embedder.clone(), store.clone(), 10);

        let report = idx.ingest(7, Vec::new()).await.unwrap();
        assert_eq!(report.chunks, 0);
        assert_eq!(report.batches, 0);
        assert!(store.ensured.lock().unwrap().is_empty());
        assert!(store.upserts.lock().unwrap().is_empty());
        assert!(embedder.call_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_preserves_positional_order_within_batch() {
        let store = Arc::new(RecordingStore::default());
        let idx = index(Arc::new(ScriptedEmbedder::new()), store.clone(), 10);

        idx.ingest(7, chunks(25)).await.unwrap();

        let upserts = store.upserts.lock().unwrap();
        let contents: Vec<String> = upserts
            .iter()
            .flat_map(|(_, points)| points.iter().map(|p| p.chunk.content.clone()))
            .collect();
        let expected: Vec<String> = (0..25).map(|i| format!("chunk {i}")).collect();
        assert_eq!(contents, expected);
    }

    #[tokio::test]
    async fn test_ingest_point_ids_unique_across_calls() {
        let store = Arc::new(RecordingStore::default());
        let idx = index(Arc::new(ScriptedEmbedder::new()), store.clone(), 16);

        idx.ingest(7, chunks(40)).await.unwrap();
        idx.ingest(7, chunks(40)).await.unwrap();

        let upserts = store.upserts.lock().unwrap();
        let mut seen = HashSet::new();
        for (_, points) in upserts.iter() {
            for point in points {
                assert!(seen.insert(point.id.clone()), "duplicate id {}", point.id);
            }
        }
        assert_eq!(seen.len(), 80);
    }

    #[tokio::test]
    async fn test_ingest_aborts_on_failing_batch_without_rollback() {
        let embedder = Arc::new(ScriptedEmbedder::failing_on(2));
        let store = Arc::new(RecordingStore::default());
        let idx = index(embedder.clone(), store.clone(), 100);

        let err = idx.ingest(7, chunks(250)).await.unwrap_err();

        // Batch 1 was uploaded and stays; batch 3 was never attempted.
        assert_eq!(err.batch_index(), Some(2));
        assert_eq!(err.batches_uploaded(), 1);
        assert_eq!(embedder.call_sizes(), vec![100, 100]);
        assert_eq!(store.upserts.lock().unwrap().len(), 1);

        match err {
            IngestError::Embedding {
                tenant_id,
                batch_count,
                ..
            } => {
                assert_eq!(tenant_id, 7);
                assert_eq!(batch_count, 3);
            }
            other => panic!("expected embedding error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_embeds_query_once_and_passes_limit() {
        let embedder = Arc::new(ScriptedEmbedder::new());
        let store = Arc::new(RecordingStore::default());
        *store.search_results.lock().unwrap() = vec![SearchResult {
            score: 0.9,
            content: "a".to_string(),
            document_name: "doc.pdf".to_string(),
            document_id: 42,
            page: 1,
        }];
        let idx = index(embedder.clone(), store.clone(), 10);

        let results = idx.search(7, "matching a", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "a");
        assert_eq!(embedder.call_sizes(), vec![1]);
        assert_eq!(*store.searches.lock().unwrap(), vec![(7, 5)]);
    }

    #[tokio::test]
    async fn test_search_rejects_zero_top_k() {
        let idx = index(
            Arc::new(ScriptedEmbedder::new()),
            Arc::new(RecordingStore::default()),
            10,
        );
        let err = idx.search(7, "query", 0).await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let idx = index(
            Arc::new(ScriptedEmbedder::new()),
            Arc::new(RecordingStore::default()),
            10,
        );
        let err = idx.search(7, "   ", 5).await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_delete_scopes_to_tenant_and_name() {
        let store = Arc::new(RecordingStore::default());
        let idx = index(Arc::new(ScriptedEmbedder::new()), store.clone(), 10);

        idx.delete_document(7, "report.pdf").await.unwrap();
        assert_eq!(
            *store.deletes.lock().unwrap(),
            vec![(7, "report.pdf".to_string())]
        );
    }
}
