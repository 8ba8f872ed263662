//! Search result projection returned to callers.

use serde::{Deserialize, Serialize};

/// A single similarity-search hit, projected from the store payload.
///
/// Results are returned in the store's rank order (similarity score,
/// descending) and are not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Similarity score reported by the store.
    pub score: f32,

    /// Chunk text.
    pub content: String,

    /// Source document file name.
    pub document_name: String,

    /// Source document identifier.
    pub document_id: i64,

    /// 1-indexed page within the source document.
    pub page: u32,
}
