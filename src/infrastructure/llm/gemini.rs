use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::gemini;
use std::time::Duration;

use crate::domain::{ports::LlmService, DomainError};
use crate::infrastructure::config::LlmConfig;

/// Gemini chat model reached through rig. Reads `GEMINI_API_KEY`.
pub struct GeminiLlm {
    client: gemini::Client,
    model: String,
    temperature: f64,
    timeout: Duration,
}

impl GeminiLlm {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: gemini::Client::from_env(),
            model: model.into(),
            temperature: 0.0,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(&config.model)
            .with_temperature(config.temperature)
            .with_timeout(Duration::from_secs(config.timeout_seconds))
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, system: Option<&str>, prompt: &str) -> Result<String, DomainError> {
        let mut builder = self
            .client
            .agent(&self.model)
            .temperature(self.temperature);
        if let Some(system) = system {
            builder = builder.preamble(system);
        }
        let agent = builder.build();

        tokio::time::timeout(self.timeout, agent.prompt(prompt))
            .await
            .map_err(|_| DomainError::timeout("LLM call timed out"))?
            .map_err(|e| DomainError::external(e.to_string()))
    }
}

#[async_trait]
impl LlmService for GeminiLlm {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.run(None, prompt).await
    }

    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        self.run(Some(system), prompt).await
    }
}
