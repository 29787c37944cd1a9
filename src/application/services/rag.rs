use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{EmbeddingService, LlmService, VectorStore},
    DocumentChunk, DomainError, SearchResult,
};

pub const CONTEXT_PLACEHOLDER: &str = "{context}";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an assistant for question-answering tasks. \
    Use the following pieces of retrieved context to answer. If you don't know the answer, \
    say that you don't know. Be concise.\n\n{context}";

/// Answer produced from retrieved passages.
#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    pub answer: String,
    pub sources: Vec<SearchResult>,
}

pub struct RagService {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    llm: Arc<dyn LlmService>,
    default_top_k: usize,
    system_prompt: String,
}

impl RagService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        llm: Arc<dyn LlmService>,
        default_top_k: usize,
    ) -> Self {
        Self {
            embedding,
            vector_store,
            llm,
            default_top_k,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// The prompt must contain a `{context}` placeholder for the passages.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    #[instrument(skip(self))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>, DomainError> {
        self.retrieve_top_k(query, self.default_top_k).await
    }

    #[instrument(skip(self))]
    pub async fn retrieve_top_k(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let embedding = self.embedding.embed(query).await?;
        self.vector_store.search(&embedding, top_k).await
    }

    /// Retrieves context for `question` and asks the model to answer from it.
    #[instrument(skip(self))]
    pub async fn answer(&self, question: &str) -> Result<RagAnswer, DomainError> {
        let sources = self.retrieve(question).await?;
        let context = sources
            .iter()
            .map(|r| r.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let system = self.system_prompt.replace(CONTEXT_PLACEHOLDER, &context);

        let answer = self.llm.complete_with_system(&system, question).await?;
        tracing::debug!(sources = sources.len(), "answer generated");

        Ok(RagAnswer { answer, sources })
    }

    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    pub async fn index_chunks(&self, chunks: &[DocumentChunk]) -> Result<(), DomainError> {
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedding.embed_batch(&texts).await?;

        for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
            self.vector_store.upsert(chunk, embedding).await?;
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_document(&self, document_id: uuid::Uuid) -> Result<(), DomainError> {
        self.vector_store.delete_by_document(document_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chunk_content;
    use crate::test_support::{rag_with_llm, StubLlm};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_answer_injects_retrieved_context() {
        let llm = Arc::new(StubLlm::replying("Five days."));
        let (rag, _) = rag_with_llm(llm.clone());
        let chunks = chunk_content(
            Uuid::new_v4(),
            "Refunds take five days.\n\nOur office is in Lisbon.",
            30,
        );
        rag.index_chunks(&chunks).await.unwrap();

        let answer = rag.answer("How long do refunds take?").await.unwrap();

        assert_eq!(answer.answer, "Five days.");
        assert_eq!(answer.sources[0].chunk.content, "Refunds take five days.");
        let system = llm.last_system().unwrap();
        assert!(system.contains("Refunds take five days."));
        assert!(!system.contains(CONTEXT_PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_answer_surfaces_model_failure() {
        let (rag, _) = rag_with_llm(Arc::new(StubLlm::failing()));
        let result = rag.answer("anything").await;
        assert!(matches!(result, Err(DomainError::ExternalService(_))));
    }

    #[tokio::test]
    async fn test_delete_document_removes_vectors() {
        let (rag, store) = rag_with_llm(Arc::new(StubLlm::default()));
        let doc_id = Uuid::new_v4();
        rag.index_chunks(&chunk_content(doc_id, "Some text.", 100))
            .await
            .unwrap();
        assert_eq!(store.len(), 1);

        rag.delete_document(doc_id).await.unwrap();
        assert!(store.is_empty());
    }
}
