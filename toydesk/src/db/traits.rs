use async_trait::async_trait;

use crate::error::Result;
use crate::models::ChatTurn;

/// Persistence for conversation turns.
#[async_trait]
pub trait ChatHistoryStore: Send + Sync {
    /// Up to `limit` most recent turns, newest first.
    async fn recent_turns(&self, user_id: &str, limit: u32) -> Result<Vec<ChatTurn>>;
    async fn append_turn(&self, turn: &ChatTurn) -> Result<()>;
    /// Returns the number of turns removed.
    async fn clear_history(&self, user_id: &str) -> Result<u64>;
}

/// Everything the service needs from a database.
#[async_trait]
pub trait DatabaseBackend: ChatHistoryStore {
    async fn sync(&self) -> Result<()>;

    /// Cheap round trip used by the health endpoint.
    async fn ping(&self) -> Result<()>;
}
