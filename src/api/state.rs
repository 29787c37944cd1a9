use std::sync::Arc;

use crate::application::{AssistantService, DocumentService, RagService};
use crate::infrastructure::{AppConfig, ChatAgent, Services};

#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<AssistantService>,
    pub documents: Arc<DocumentService>,
    pub rag: Arc<RagService>,
    pub agent: Option<Arc<ChatAgent>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(services: Services, config: AppConfig) -> Self {
        Self {
            assistant: services.assistant,
            documents: services.documents,
            rag: services.rag,
            agent: services.agent,
            config: Arc::new(config),
        }
    }
}
