use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::{ports::DocumentStore, Document, DocumentChunk, DomainError};

#[derive(Default)]
struct Inner {
    documents: HashMap<Uuid, Document>,
    chunks: HashMap<Uuid, Vec<DocumentChunk>>,
}

/// Process-local document registry.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    inner: RwLock<Inner>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn save_document(&self, doc: &Document) -> Result<(), DomainError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        inner.documents.insert(doc.id, doc.clone());
        Ok(())
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>, DomainError> {
        let inner = self
            .inner
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(inner.documents.get(&id).cloned())
    }

    async fn list_documents(&self) -> Result<Vec<Document>, DomainError> {
        let inner = self
            .inner
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        let mut docs: Vec<Document> = inner.documents.values().cloned().collect();
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(docs)
    }

    async fn delete_document(&self, id: Uuid) -> Result<(), DomainError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        inner.documents.remove(&id);
        inner.chunks.remove(&id);
        Ok(())
    }

    async fn save_chunks(&self, chunks: &[DocumentChunk]) -> Result<(), DomainError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        for chunk in chunks {
            let entry = inner.chunks.entry(chunk.document_id).or_default();
            entry.retain(|c| c.id != chunk.id);
            entry.push(chunk.clone());
            entry.sort_by_key(|c| c.chunk_index);
        }
        Ok(())
    }

    async fn get_chunks(&self, document_id: Uuid) -> Result<Vec<DocumentChunk>, DomainError> {
        let inner = self
            .inner
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(inner.chunks.get(&document_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_fetch_document_with_chunks() {
        let store = InMemoryDocumentStore::new();
        let doc = Document::new("manual.txt");
        let chunks = vec![
            DocumentChunk::new(doc.id, "second", 1),
            DocumentChunk::new(doc.id, "first", 0),
        ];

        store.save_document(&doc).await.unwrap();
        store.save_chunks(&chunks).await.unwrap();

        let fetched = store.get_document(doc.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "manual.txt");

        let stored = store.get_chunks(doc.id).await.unwrap();
        let contents: Vec<&str> = stored.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_delete_removes_chunks() {
        let store = InMemoryDocumentStore::new();
        let doc = Document::new("a.txt");
        store.save_document(&doc).await.unwrap();
        store
            .save_chunks(&[DocumentChunk::new(doc.id, "x", 0)])
            .await
            .unwrap();

        store.delete_document(doc.id).await.unwrap();

        assert!(store.get_document(doc.id).await.unwrap().is_none());
        assert!(store.get_chunks(doc.id).await.unwrap().is_empty());
        assert!(store.list_documents().await.unwrap().is_empty());
    }
}
