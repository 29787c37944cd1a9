use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;

use crate::application::{AssistantService, DocumentService, RagService};
use crate::domain::ports::{EmbeddingService, LlmService, SessionStore, VectorStore};
use crate::domain::DomainError;
use crate::infrastructure::config::{AppConfig, SessionBackend, VectorBackend};
use crate::infrastructure::{
    create_pool, ChatAgent, GeminiEmbedding, GeminiLlm, InMemoryDocumentStore,
    InMemorySessionStore, InMemoryVectorStore, PdfTextExtractor, QdrantVectorStore,
    RedisSessionStore,
};

const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Fully wired service graph shared by the HTTP server and the CLI.
#[derive(Clone)]
pub struct Services {
    pub assistant: Arc<AssistantService>,
    pub documents: Arc<DocumentService>,
    pub rag: Arc<RagService>,
    /// Only present when model credentials are available.
    pub agent: Option<Arc<ChatAgent>>,
}

impl Services {
    /// Connects the configured backends. Fails fast when the model
    /// credentials are missing or a backend is unreachable.
    pub async fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        if std::env::var(API_KEY_ENV).map_or(true, |v| v.is_empty()) {
            return Err(DomainError::validation(format!("{API_KEY_ENV} must be set")));
        }

        let embedding: Arc<dyn EmbeddingService> =
            Arc::new(GeminiEmbedding::from_config(&config.config.embedding));
        let llm: Arc<dyn LlmService> = Arc::new(GeminiLlm::from_config(&config.config.llm));

        let vector_store: Arc<dyn VectorStore> = match config.config.vector_store.backend {
            VectorBackend::Memory => Arc::new(InMemoryVectorStore::new()),
            VectorBackend::Qdrant => Arc::new(
                QdrantVectorStore::from_config(
                    &config.config.vector_store,
                    embedding.dimension(),
                )
                .await?,
            ),
        };

        let ttl = Duration::from_secs(config.config.session.ttl_seconds);
        let sessions: Arc<dyn SessionStore> = match config.config.session.backend {
            SessionBackend::Memory => Arc::new(InMemorySessionStore::new(ttl)),
            SessionBackend::Redis => {
                let pool = create_pool(&config.config.session.redis_url)?;
                Arc::new(RedisSessionStore::new(pool, ttl))
            }
        };

        let mut services = Self::assemble(config, embedding, vector_store, llm, sessions);
        services.agent = Some(Arc::new(ChatAgent::new(services.rag.clone(), config)));
        Ok(services)
    }

    /// Builds the graph from already constructed adapters. The agent is
    /// left unset.
    pub fn assemble(
        config: &AppConfig,
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        llm: Arc<dyn LlmService>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let rag = Arc::new(
            RagService::new(embedding, vector_store, llm, config.config.rag.top_k)
                .with_system_prompt(&config.prompts.rag.system),
        );
        let documents = Arc::new(
            DocumentService::with_chunk_size(
                Arc::new(InMemoryDocumentStore::new()),
                rag.clone(),
                config.config.rag.chunk_size,
            )
            .with_pdf_extractor(Arc::new(PdfTextExtractor::new())),
        );
        let form_ttl =
            ChronoDuration::from_std(Duration::from_secs(config.config.session.ttl_seconds))
                .unwrap_or(ChronoDuration::MAX);
        let assistant = Arc::new(
            AssistantService::new(sessions, documents.clone(), rag.clone())
                .with_form_ttl(form_ttl),
        );
        Self {
            assistant,
            documents,
            rag,
            agent: None,
        }
    }
}
