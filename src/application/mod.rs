//! Application layer - Use cases and orchestration.
//!
//! Services depend on domain ports (traits) rather than concrete adapters:
//! document ingestion, retrieval-augmented answering, and the per-turn
//! dispatcher that drives the conversational forms.

pub mod services;

pub use services::{
    content_type_for, AssistantReply, AssistantService, DocumentService, RagAnswer, RagService,
    ReplyKind, SourcePassage,
};
