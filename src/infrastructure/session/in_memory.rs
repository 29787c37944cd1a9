use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::domain::{ports::SessionStore, ConversationState, DomainError};

/// Conversation states held in process memory. An entry not saved for longer
/// than `ttl` is dropped the next time it is loaded.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, (ConversationState, Instant)>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Removes every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        match self.sessions.write() {
            Ok(mut sessions) => retain_live(&mut sessions, self.ttl),
            Err(_) => 0,
        }
    }
}

fn retain_live(sessions: &mut HashMap<Uuid, (ConversationState, Instant)>, ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, (_, saved_at)| saved_at.elapsed() <= ttl);
    before - sessions.len()
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<ConversationState>, DomainError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let expired = match sessions.get(&id) {
            Some((_, saved_at)) => saved_at.elapsed() > self.ttl,
            None => return Ok(None),
        };

        if expired {
            sessions.remove(&id);
            tracing::debug!(conversation_id = %id, "session expired");
            return Ok(None);
        }

        Ok(sessions.get(&id).map(|(state, _)| state.clone()))
    }

    async fn save(&self, state: &ConversationState) -> Result<(), DomainError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        // New conversations sweep out abandoned ones.
        if !sessions.contains_key(&state.id) {
            let dropped = retain_live(&mut sessions, self.ttl);
            if dropped > 0 {
                tracing::debug!(dropped, "expired sessions purged");
            }
        }
        sessions.insert(state.id, (state.clone(), Instant::now()));
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        sessions.remove(&id);
        Ok(())
    }
}
