use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, ConversationState};

/// Per-conversation state storage. Entries that sit idle longer than the
/// store's TTL disappear and load as `None`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Option<ConversationState>, DomainError>;
    async fn save(&self, state: &ConversationState) -> Result<(), DomainError>;
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}
