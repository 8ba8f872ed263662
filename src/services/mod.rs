mod batch;
mod embedding;
mod index;
mod vector_store;

pub use batch::{ChunkBatch, partition_chunks};
pub use embedding::{Embedder, EmbeddingClient, HealthResponse};
pub use index::{DocumentIndex, IngestReport};
pub use vector_store::{ChunkPoint, QdrantBackend, VectorStore};
