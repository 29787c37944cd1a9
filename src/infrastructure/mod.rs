pub mod agent;
pub mod config;
pub mod document_store;
pub mod embedding;
pub mod extraction;
pub mod llm;
pub mod session;
pub mod telemetry;
pub mod tools;
pub mod vector_store;
mod wiring;

pub use agent::ChatAgent;
pub use config::{AppConfig, Config, ConfigError, PromptsConfig};
pub use document_store::InMemoryDocumentStore;
pub use embedding::GeminiEmbedding;
pub use extraction::PdfTextExtractor;
pub use llm::GeminiLlm;
pub use session::{create_pool, InMemorySessionStore, RedisPool, RedisSessionStore};
pub use telemetry::init_tracing;
pub use tools::{KnowledgeBaseTool, ParseDateTool, ValidateEmailTool, ValidatePhoneTool};
pub use vector_store::{InMemoryVectorStore, QdrantVectorStore};
pub use wiring::Services;
