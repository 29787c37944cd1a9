use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::instrument;
use uuid::Uuid;

use crate::application::RagService;
use crate::domain::{
    chunk_content, chunk_pages,
    ports::{DocumentStore, TextExtractor},
    Document, DocumentChunk, DomainError, PDF_CONTENT_TYPE,
};

/// Ingests documents into the store and the vector index.
///
/// One document is active at a time: loading a new one retires the previous
/// document and its vectors, so questions are answered from the latest upload.
/// PDFs are accepted once a [`TextExtractor`] is attached.
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    rag: Arc<RagService>,
    pdf: Option<Arc<dyn TextExtractor>>,
    chunk_size: usize,
    active: RwLock<Option<Uuid>>,
}

impl DocumentService {
    pub fn new(store: Arc<dyn DocumentStore>, rag: Arc<RagService>) -> Self {
        Self::with_chunk_size(store, rag, 1000)
    }

    pub fn with_chunk_size(
        store: Arc<dyn DocumentStore>,
        rag: Arc<RagService>,
        chunk_size: usize,
    ) -> Self {
        Self {
            store,
            rag,
            pdf: None,
            chunk_size,
            active: RwLock::new(None),
        }
    }

    pub fn with_pdf_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.pdf = Some(extractor);
        self
    }

    #[instrument(skip(self, content), fields(bytes = content.len()))]
    pub async fn ingest(
        &self,
        name: &str,
        content: &str,
        content_type: Option<&str>,
    ) -> Result<(Document, Vec<DocumentChunk>), DomainError> {
        let doc = Document::new(name)
            .with_content_type(content_type.unwrap_or("text/plain"))
            .with_metadata(serde_json::json!({ "characters": content.chars().count() }));

        if !doc.is_text() {
            return Err(DomainError::validation(format!(
                "unsupported content type '{}'",
                doc.content_type
            )));
        }

        let chunks = chunk_content(doc.id, content, self.chunk_size);
        self.store_and_index(doc, chunks).await
    }

    /// Ingests raw file bytes: PDFs go through the extractor, text types must
    /// be UTF-8.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn ingest_bytes(
        &self,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(Document, Vec<DocumentChunk>), DomainError> {
        if content_type != PDF_CONTENT_TYPE {
            let content = std::str::from_utf8(bytes)
                .map_err(|_| DomainError::validation(format!("{name} is not valid UTF-8 text")))?;
            return self.ingest(name, content, Some(content_type)).await;
        }

        let extractor = self
            .pdf
            .clone()
            .ok_or_else(|| DomainError::validation("PDF ingestion is not enabled"))?;
        let owned = bytes.to_vec();
        let pages = tokio::task::spawn_blocking(move || extractor.extract_pages(&owned))
            .await
            .map_err(|e| DomainError::internal(format!("PDF extraction task failed: {e}")))??;

        let doc = Document::new(name)
            .with_content_type(PDF_CONTENT_TYPE)
            .with_metadata(serde_json::json!({ "pages": pages.len() }));
        let chunks = chunk_pages(doc.id, &pages, self.chunk_size);
        self.store_and_index(doc, chunks).await
    }

    async fn store_and_index(
        &self,
        doc: Document,
        chunks: Vec<DocumentChunk>,
    ) -> Result<(Document, Vec<DocumentChunk>), DomainError> {
        if chunks.is_empty() {
            return Err(DomainError::validation("document has no readable text"));
        }

        self.store.save_document(&doc).await?;
        self.store.save_chunks(&chunks).await?;

        if let Err(e) = self.rag.index_chunks(&chunks).await {
            tracing::error!(document_id = %doc.id, error = %e, "indexing failed, rolling back");
            self.rag.delete_document(doc.id).await.ok();
            self.store.delete_document(doc.id).await.ok();
            return Err(e);
        }

        if let Some(previous) = self.swap_active(Some(doc.id))? {
            self.retire(previous).await?;
        }

        tracing::info!(document_id = %doc.id, chunks = chunks.len(), "document loaded");
        Ok((doc, chunks))
    }

    /// Reads a PDF or text file from disk and ingests it.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn ingest_file(
        &self,
        path: &Path,
    ) -> Result<(Document, Vec<DocumentChunk>), DomainError> {
        let content_type = content_type_for(path).ok_or_else(|| {
            DomainError::validation(format!("unsupported file type: {}", path.display()))
        })?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DomainError::validation(format!("cannot read {}: {e}", path.display())))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.ingest_bytes(&name, &bytes, content_type).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Document>, DomainError> {
        self.store.get_document(id).await
    }

    #[instrument(skip(self))]
    pub async fn get_with_chunks(
        &self,
        id: Uuid,
    ) -> Result<Option<(Document, Vec<DocumentChunk>)>, DomainError> {
        match self.store.get_document(id).await? {
            Some(doc) => {
                let chunks = self.store.get_chunks(id).await?;
                Ok(Some((doc, chunks)))
            }
            None => Ok(None),
        }
    }

    pub async fn list(&self) -> Result<Vec<Document>, DomainError> {
        self.store.list_documents().await
    }

    pub async fn active_document(&self) -> Result<Option<Document>, DomainError> {
        match self.active_id()? {
            Some(id) => self.store.get_document(id).await,
            None => Ok(None),
        }
    }

    pub fn has_document(&self) -> bool {
        matches!(self.active_id(), Ok(Some(_)))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if self.store.get_document(id).await?.is_none() {
            return Err(DomainError::not_found(format!("document {id}")));
        }
        if self.active_id()? == Some(id) {
            self.swap_active(None)?;
        }
        self.retire(id).await
    }

    async fn retire(&self, id: Uuid) -> Result<(), DomainError> {
        self.rag.delete_document(id).await?;
        self.store.delete_document(id).await
    }

    fn active_id(&self) -> Result<Option<Uuid>, DomainError> {
        self.active
            .read()
            .map(|active| *active)
            .map_err(|e| DomainError::internal(e.to_string()))
    }

    fn swap_active(&self, id: Option<Uuid>) -> Result<Option<Uuid>, DomainError> {
        let mut active = self
            .active
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(std::mem::replace(&mut *active, id))
    }
}

/// Maps a file extension to a supported text content type.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "txt" | "text" => Some("text/plain"),
        "md" | "markdown" => Some("text/markdown"),
        "csv" => Some("text/csv"),
        "json" => Some("application/json"),
        "pdf" => Some(PDF_CONTENT_TYPE),
        _ => None,
    }
}
