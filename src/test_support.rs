//! Deterministic stand-ins for the model-backed ports.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::AppState;
use crate::application::RagService;
use crate::domain::ports::{EmbeddingService, LlmService};
use crate::domain::{DomainError, Embedding};
use crate::infrastructure::{AppConfig, InMemorySessionStore, InMemoryVectorStore, Services};

const STUB_DIMENSION: usize = 256;

/// Bag-of-words hashing embedding: texts sharing words score as similar.
pub struct StubEmbedding;

impl StubEmbedding {
    fn vectorize(text: &str) -> Embedding {
        let mut vec = vec![0.0f32; STUB_DIMENSION];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vec[(hasher.finish() % STUB_DIMENSION as u64) as usize] += 1.0;
        }
        Embedding::new(vec)
    }
}

#[async_trait]
impl EmbeddingService for StubEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        Ok(Self::vectorize(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        Ok(texts.iter().map(|t| Self::vectorize(t)).collect())
    }

    fn dimension(&self) -> usize {
        STUB_DIMENSION
    }
}

/// Records every call and answers with a fixed reply, or fails when built
/// with [`StubLlm::failing`].
#[derive(Default)]
pub struct StubLlm {
    pub reply: String,
    pub fail: bool,
    pub calls: Mutex<Vec<(Option<String>, String)>>,
}

impl StubLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn last_system(&self) -> Option<String> {
        self.calls
            .lock()
            .ok()
            .and_then(|calls| calls.last().and_then(|(system, _)| system.clone()))
    }

    fn respond(&self, system: Option<&str>, prompt: &str) -> Result<String, DomainError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((system.map(str::to_string), prompt.to_string()));
        }
        if self.fail {
            return Err(DomainError::external("model unavailable"));
        }
        Ok(self.reply.clone())
    }
}

#[async_trait]
impl LlmService for StubLlm {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.respond(None, prompt)
    }

    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        self.respond(Some(system), prompt)
    }
}

pub fn rag_with_llm(llm: Arc<StubLlm>) -> (Arc<RagService>, Arc<InMemoryVectorStore>) {
    let store = Arc::new(InMemoryVectorStore::new());
    let rag = RagService::new(Arc::new(StubEmbedding), store.clone(), llm, 3);
    (Arc::new(rag), store)
}

pub fn rag_with_memory_store() -> (Arc<RagService>, Arc<InMemoryVectorStore>) {
    rag_with_llm(Arc::new(StubLlm::replying("stub answer")))
}

pub fn app_state_with_llm(config: AppConfig, llm: StubLlm) -> AppState {
    let services = Services::assemble(
        &config,
        Arc::new(StubEmbedding),
        Arc::new(InMemoryVectorStore::new()),
        Arc::new(llm),
        Arc::new(InMemorySessionStore::new(Duration::from_secs(
            config.config.session.ttl_seconds,
        ))),
    );
    AppState::new(services, config)
}

pub fn app_state(config: AppConfig) -> AppState {
    app_state_with_llm(config, StubLlm::replying("stub answer"))
}
