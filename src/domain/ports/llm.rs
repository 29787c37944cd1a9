use crate::domain::errors::DomainError;
use async_trait::async_trait;

/// Single-shot text generation.
#[async_trait]
pub trait LlmService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError>;

    /// Generates with a system preamble, used to inject retrieved context.
    async fn complete_with_system(&self, system: &str, prompt: &str)
        -> Result<String, DomainError>;
}
