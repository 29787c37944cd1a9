//! Seams to the external collaborators: embedding model, vector index,
//! language model, document registry, text extraction and per-conversation
//! session storage.

mod document_store;
mod embedding;
mod llm;
mod session_store;
mod text_extractor;
mod vector_store;

pub use document_store::DocumentStore;
pub use embedding::EmbeddingService;
pub use llm::LlmService;
pub use session_store::SessionStore;
pub use text_extractor::TextExtractor;
pub use vector_store::VectorStore;
