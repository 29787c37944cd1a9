mod in_memory;
mod redis;

pub use self::redis::{create_pool, RedisPool, RedisSessionStore};
pub use in_memory::InMemorySessionStore;

pub mod keys {
    use uuid::Uuid;

    pub fn conversation(conversation_id: &Uuid) -> String {
        format!("conversation:{}", conversation_id)
    }
}
