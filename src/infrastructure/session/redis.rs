use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Connection, Pool, Runtime};
use std::time::Duration;
use uuid::Uuid;

use super::keys;
use crate::domain::{ports::SessionStore, ConversationState, DomainError};

pub type RedisPool = Pool;

pub fn create_pool(redis_url: &str) -> Result<RedisPool, DomainError> {
    let cfg = Config::from_url(redis_url);
    cfg.create_pool(Some(Runtime::Tokio1))
        .map_err(|e| DomainError::external(format!("Redis pool error: {e}")))
}

/// Conversation states stored as JSON under `conversation:{id}`, with the
/// TTL refreshed on every save.
#[derive(Clone)]
pub struct RedisSessionStore {
    pool: RedisPool,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub fn new(pool: RedisPool, ttl: Duration) -> Self {
        Self {
            pool,
            ttl_seconds: ttl.as_secs().max(1),
        }
    }

    async fn conn(&self) -> Result<Connection, DomainError> {
        self.pool
            .get()
            .await
            .map_err(|e| DomainError::external(format!("Redis pool error: {e}")))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<ConversationState>, DomainError> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn
            .get(keys::conversation(&id))
            .await
            .map_err(|e| DomainError::external(format!("Redis error: {e}")))?;

        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| DomainError::internal(e.to_string()))
        })
        .transpose()
    }

    async fn save(&self, state: &ConversationState) -> Result<(), DomainError> {
        let json = serde_json::to_string(state).map_err(|e| DomainError::internal(e.to_string()))?;
        let mut conn = self.conn().await?;
        conn.set_ex::<_, _, ()>(keys::conversation(&state.id), &json, self.ttl_seconds)
            .await
            .map_err(|e| DomainError::external(format!("Redis error: {e}")))?;

        tracing::debug!(conversation_id = %state.id, "session saved");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(keys::conversation(&id))
            .await
            .map_err(|e| DomainError::external(format!("Redis error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_key_layout() {
        let id = Uuid::nil();
        assert_eq!(
            keys::conversation(&id),
            "conversation:00000000-0000-0000-0000-000000000000"
        );
    }

    #[tokio::test]
    async fn test_unreachable_redis_is_external_error() {
        let pool = create_pool("redis://127.0.0.1:1").unwrap();
        let store = RedisSessionStore::new(pool, Duration::from_secs(60));

        let result = store.load(Uuid::new_v4()).await;
        assert!(matches!(result, Err(DomainError::ExternalService(_))));
    }
}
