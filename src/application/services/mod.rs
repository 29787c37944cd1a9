mod assistant;
mod document;
mod rag;

pub use assistant::{AssistantReply, AssistantService, ReplyKind, SourcePassage};
pub use document::{content_type_for, DocumentService};
pub use rag::{RagAnswer, RagService, CONTEXT_PLACEHOLDER, DEFAULT_SYSTEM_PROMPT};
