use serde::{Deserialize, Serialize};

/// One retrievable span of extracted document text, produced by an upstream
/// loader/splitter. Chunks are consumed by the ingestion pipeline and not
/// retained after upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Owning tenant. Documents of different tenants never share a collection.
    pub tenant_id: i64,

    /// Identifier of the source document in the upstream metadata store.
    pub document_id: i64,

    /// File name of the source document; indexed for filtered deletion.
    pub document_name: String,

    /// 1-indexed page the chunk was extracted from.
    pub page: u32,

    /// Extracted text.
    pub content: String,
}

impl Chunk {
    pub fn new(
        tenant_id: i64,
        document_id: i64,
        document_name: impl Into<String>,
        page: u32,
        content: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id,
            document_id,
            document_name: document_name.into(),
            page,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_roundtrips_through_json() {
        let chunk = Chunk::new(7, 42, "report.pdf", 3, "quarterly figures");
        let json = serde_json::to_string(&chunk).unwrap();
        let back: Chunk = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tenant_id, 7);
        assert_eq!(back.document_id, 42);
        assert_eq!(back.document_name, "report.pdf");
        assert_eq!(back.page, 3);
        assert_eq!(back.content, "quarterly figures");
    }
}
