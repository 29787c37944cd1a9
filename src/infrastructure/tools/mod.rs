//! Tools exposed to the rig agent.

mod knowledge_base;
mod validation;

pub use knowledge_base::{KnowledgeBaseArgs, KnowledgeBaseError, KnowledgeBaseTool};
pub use validation::{
    ParseDateTool, ToolInput, ValidateEmailTool, ValidatePhoneTool, INVALID_DATE, INVALID_EMAIL,
    INVALID_PHONE, VALID_EMAIL, VALID_PHONE,
};
