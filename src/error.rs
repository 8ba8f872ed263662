//! Error types for the document vault pipeline.

use thiserror::Error;

use crate::utils::retry::Retryable;

/// Errors raised while loading and validating configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value} ({reason})")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Errors related to embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("failed to connect to embedding server: {0}")]
    ConnectionError(String),

    #[error("embedding server error: {0}")]
    ServerError(String),

    #[error("embedding request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("embedding count mismatch: sent {sent} texts, received {received} vectors")]
    CountMismatch { sent: usize, received: usize },

    #[error("embedding dimension mismatch: expected {expected}, received {received}")]
    DimensionMismatch { expected: usize, received: usize },

    #[error("embedding timeout")]
    Timeout,
}

impl Retryable for EmbeddingError {
    fn is_retryable(&self) -> bool {
        match self {
            EmbeddingError::ConnectionError(_) | EmbeddingError::Timeout => true,
            EmbeddingError::ServerError(msg) => {
                msg.contains("503")
                    || msg.contains("502")
                    || msg.contains("504")
                    || msg.contains("429")
                    || msg.to_lowercase().contains("unavailable")
                    || msg.to_lowercase().contains("too many requests")
            }
            EmbeddingError::RequestError(e) => e.is_timeout() || e.is_connect(),
            EmbeddingError::InvalidResponse(_)
            | EmbeddingError::CountMismatch { .. }
            | EmbeddingError::DimensionMismatch { .. } => false,
        }
    }
}

/// Errors related to vector store operations.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("failed to connect to vector store: {0}")]
    ConnectionError(String),

    #[error("collection error: {0}")]
    CollectionError(String),

    #[error("upsert error: {0}")]
    UpsertError(String),

    #[error("search error: {0}")]
    SearchError(String),

    #[error("delete error: {0}")]
    DeleteError(String),
}

impl Retryable for VectorStoreError {
    fn is_retryable(&self) -> bool {
        match self {
            VectorStoreError::ConnectionError(_) => true,
            VectorStoreError::CollectionError(msg)
            | VectorStoreError::UpsertError(msg)
            | VectorStoreError::SearchError(msg)
            | VectorStoreError::DeleteError(msg) => {
                let msg_lower = msg.to_lowercase();
                msg_lower.contains("timeout")
                    || msg_lower.contains("connection")
                    || msg_lower.contains("unavailable")
                    || msg_lower.contains("too many")
            }
        }
    }
}

/// Errors raised while constructing the process-wide client handles at
/// startup.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to initialize embedding client: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("failed to initialize vector store client: {0}")]
    VectorStore(#[from] VectorStoreError),
}

/// Errors raised by the ingestion pipeline.
///
/// Batch variants carry the 1-based index of the failing batch and the number
/// of batches already uploaded. Uploaded batches are never rolled back, so a
/// caller recovering from a batch failure must delete the document before
/// re-ingesting to avoid duplicate points.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to prepare collection for tenant {tenant_id}: {source}")]
    Collection {
        tenant_id: i64,
        #[source]
        source: VectorStoreError,
    },

    #[error(
        "embedding failed for tenant {tenant_id} on batch {batch_index} of {batch_count} \
         ({batches_uploaded} batches already uploaded): {source}"
    )]
    Embedding {
        tenant_id: i64,
        batch_index: usize,
        batch_count: usize,
        batches_uploaded: usize,
        #[source]
        source: EmbeddingError,
    },

    #[error(
        "upload failed for tenant {tenant_id} on batch {batch_index} of {batch_count} \
         ({batches_uploaded} batches already uploaded): {source}"
    )]
    Upload {
        tenant_id: i64,
        batch_index: usize,
        batch_count: usize,
        batches_uploaded: usize,
        #[source]
        source: VectorStoreError,
    },
}

impl IngestError {
    /// 1-based index of the batch that failed, if the failure was batch-scoped.
    pub fn batch_index(&self) -> Option<usize> {
        match self {
            IngestError::Collection { .. } => None,
            IngestError::Embedding { batch_index, .. }
            | IngestError::Upload { batch_index, .. } => Some(*batch_index),
        }
    }

    /// Number of batches that were uploaded before the failure.
    pub fn batches_uploaded(&self) -> usize {
        match self {
            IngestError::Collection { .. } => 0,
            IngestError::Embedding {
                batches_uploaded, ..
            }
            | IngestError::Upload {
                batches_uploaded, ..
            } => *batches_uploaded,
        }
    }
}

/// Errors related to search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("query embedding failed for tenant {tenant_id}: {source}")]
    Embedding {
        tenant_id: i64,
        #[source]
        source: EmbeddingError,
    },

    #[error("search failed for tenant {tenant_id}: {source}")]
    VectorStore {
        tenant_id: i64,
        #[source]
        source: VectorStoreError,
    },
}

impl Retryable for SearchError {
    fn is_retryable(&self) -> bool {
        match self {
            SearchError::InvalidQuery(_) => false,
            SearchError::Embedding { source, .. } => source.is_retryable(),
            SearchError::VectorStore { source, .. } => source.is_retryable(),
        }
    }
}

/// Errors related to document deletion.
#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("delete failed for tenant {tenant_id}, document '{document_name}': {source}")]
    VectorStore {
        tenant_id: i64,
        document_name: String,
        #[source]
        source: VectorStoreError,
    },
}

impl Retryable for DeleteError {
    fn is_retryable(&self) -> bool {
        match self {
            DeleteError::VectorStore { source, .. } => source.is_retryable(),
        }
    }
}
