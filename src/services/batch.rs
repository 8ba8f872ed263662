//! Chunk batching for bulk upload.
//!
//! Partitions an arbitrary-length chunk sequence into fixed-size,
//! order-preserving batches and assigns every chunk a fresh random point id.
//! Ids are never derived from chunk content, so re-ingesting the same
//! document produces new points rather than overwriting old ones.

use uuid::Uuid;

use crate::models::Chunk;
use crate::services::vector_store::ChunkPoint;

/// One upload-ready batch: chunks in input order, each paired positionally
/// with a pre-generated point id.
#[derive(Debug, Clone)]
pub struct ChunkBatch {
    pub ids: Vec<String>,
    pub chunks: Vec<Chunk>,
}

impl ChunkBatch {
    fn new(chunks: Vec<Chunk>) -> Self {
        let ids = chunks.iter().map(|_| Uuid::new_v4().to_string()).collect();
        Self { ids, chunks }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Texts to embed, in batch order. Index i here corresponds to index i of
    /// the embedding response and of `ids`.
    pub fn contents(&self) -> Vec<String> {
        self.chunks.iter().map(|c| c.content.clone()).collect()
    }

    /// Pair each chunk with its embedding, consuming the batch.
    ///
    /// `vectors` must have the same length and order as the batch; the
    /// embedding client enforces this at the response boundary.
    pub fn into_points(self, vectors: Vec<Vec<f32>>) -> Vec<ChunkPoint> {
        self.ids
            .into_iter()
            .zip(self.chunks)
            .zip(vectors)
            .map(|((id, chunk), vector)| ChunkPoint { id, vector, chunk })
            .collect()
    }
}

/// Partition `chunks` into `ceil(N / batch_size)` batches of at most
/// `batch_size` chunks each, preserving input order.
///
/// `batch_size` must be positive; it is validated at configuration load.
pub fn partition_chunks(chunks: Vec<Chunk>, batch_size: usize) -> Vec<ChunkBatch> {
    if chunks.is_empty() {
        return Vec::new();
    }

    chunks
        .chunks(batch_size)
        .map(|window| ChunkBatch::new(window.to_vec()))
        .collect()
}
