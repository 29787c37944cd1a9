//! Application configuration.
//!
//! Settings come from a YAML file (`config/default.yaml`, or the path in
//! `APP_CONFIG`) and a handful of environment overrides. Every section has
//! defaults, so a missing file or a partial file is fine.

use serde::Deserialize;
use std::path::Path;

use crate::application::services::{CONTEXT_PLACEHOLDER, DEFAULT_SYSTEM_PROMPT};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";

/// Both the chat model and the embedding model come from this provider.
const SUPPORTED_PROVIDER: &str = "gemini";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(flatten)]
    pub config: Config,
    #[serde(default)]
    pub prompts: PromptsConfig,
}

impl AppConfig {
    /// Loads from `APP_CONFIG` or the default path, then applies environment
    /// overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("APP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let mut config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            tracing::warn!(path = %path, "config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn apply_env_overrides(&mut self) {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        if let Some(host) = env("SERVER_HOST") {
            self.config.server.host = host;
        }
        if let Some(port) = env("SERVER_PORT").and_then(|p| p.parse().ok()) {
            self.config.server.port = port;
        }
        if let Some(url) = env("REDIS_URL") {
            self.config.session.redis_url = url;
        }
        if let Some(url) = env("QDRANT_URL") {
            self.config.vector_store.url = url;
        }
        if let Some(key) = env("API_KEY") {
            self.config.api.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.config;
        if !c.llm.provider.eq_ignore_ascii_case(SUPPORTED_PROVIDER) {
            return Err(ConfigError::Invalid(format!(
                "llm.provider '{}' is not supported, expected '{SUPPORTED_PROVIDER}'",
                c.llm.provider
            )));
        }
        if c.rag.top_k == 0 {
            return Err(ConfigError::Invalid("rag.top_k must be positive".into()));
        }
        if c.rag.chunk_size == 0 {
            return Err(ConfigError::Invalid("rag.chunk_size must be positive".into()));
        }
        if c.session.ttl_seconds == 0 {
            return Err(ConfigError::Invalid("session.ttl_seconds must be positive".into()));
        }
        if !self.prompts.rag.system.contains(CONTEXT_PLACEHOLDER) {
            return Err(ConfigError::Invalid(
                "prompts.rag.system must contain a {context} placeholder".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub rag: RagConfig,
    pub vector_store: VectorStoreConfig,
    pub session: SessionConfig,
    pub cors: CorsConfig,
    pub api: ApiConfig,
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub temperature: f64,
    pub timeout_seconds: u64,
    pub max_turns: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: SUPPORTED_PROVIDER.to_string(),
            model: "gemini-1.5-pro".to_string(),
            temperature: 0.0,
            timeout_seconds: 60,
            max_turns: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "embedding-001".to_string(),
            dimension: 768,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub top_k: usize,
    pub chunk_size: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            chunk_size: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    #[default]
    Memory,
    Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub backend: VectorBackend,
    pub url: String,
    pub collection: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: VectorBackend::Memory,
            url: "http://localhost:6334".to_string(),
            collection: "documents".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    pub redis_url: String,
    pub ttl_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::Memory,
            redis_url: "redis://localhost:6379".to_string(),
            ttl_seconds: 1800,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub knowledge_base: KnowledgeBaseToolConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseToolConfig {
    pub name: String,
    pub description: String,
    pub no_results_message: String,
}

impl Default for KnowledgeBaseToolConfig {
    fn default() -> Self {
        Self {
            name: "knowledge_base".to_string(),
            description: "Search the uploaded document for passages relevant to a question."
                .to_string(),
            no_results_message: "No relevant passages found.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub rag: PromptConfig,
    pub agent: AgentPromptConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub system: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentPromptConfig {
    pub system: String,
}

impl Default for AgentPromptConfig {
    fn default() -> Self {
        Self {
            system: "You help users with an uploaded document, callback requests and \
                     appointment bookings. Use the knowledge_base tool to answer questions \
                     about the document. Use the validation tools to check email addresses \
                     and phone numbers, and the date tool to turn relative dates into \
                     YYYY-MM-DD."
                .to_string(),
        }
    }
}
