mod conversation;
mod document;
mod embedding;
mod form;

pub use conversation::{Action, ConversationState, Message, MessageRole};
pub use document::{
    chunk_content, chunk_pages, ChunkMetadata, Document, DocumentChunk, SearchResult,
    PDF_CONTENT_TYPE, TEXT_CONTENT_TYPES,
};
pub use embedding::Embedding;
pub use form::{Field, FormKind, FormRecord, FormSession, SubmitOutcome};
