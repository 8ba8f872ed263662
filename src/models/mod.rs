mod chunk;
mod config;
mod search;

pub use chunk::Chunk;
pub use config::{
    Config, DEFAULT_EMBEDDING_DIMENSION, DEFAULT_EMBEDDING_TIMEOUT_SECS, DEFAULT_EMBEDDING_URL,
    DEFAULT_INGEST_BATCH_SIZE, EmbeddingConfig, IngestConfig, VectorStoreConfig,
};
pub use search::SearchResult;
