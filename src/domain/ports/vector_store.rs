use crate::domain::{errors::DomainError, DocumentChunk, Embedding, SearchResult};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Inserts or replaces the vector stored for `chunk.id`.
    async fn upsert(&self, chunk: &DocumentChunk, embedding: &Embedding)
        -> Result<(), DomainError>;

    /// Most similar chunks first, at most `top_k` of them.
    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError>;

    async fn delete_by_document(&self, document_id: Uuid) -> Result<(), DomainError>;
}
