use async_trait::async_trait;

use crate::db::connection::Database;
use crate::db::repository::ChatHistoryRepository;
use crate::db::traits::{ChatHistoryStore, DatabaseBackend};
use crate::error::Result;
use crate::models::ChatTurn;

pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChatHistoryStore for LibSqlBackend {
    async fn recent_turns(&self, user_id: &str, limit: u32) -> Result<Vec<ChatTurn>> {
        let conn = self.db.connect()?;
        ChatHistoryRepository::recent(&conn, user_id, limit).await
    }

    async fn append_turn(&self, turn: &ChatTurn) -> Result<()> {
        let conn = self.db.connect()?;
        ChatHistoryRepository::insert(&conn, turn).await
    }

    async fn clear_history(&self, user_id: &str) -> Result<u64> {
        let conn = self.db.connect()?;
        ChatHistoryRepository::delete_for_user(&conn, user_id).await
    }
}

#[async_trait]
impl DatabaseBackend for LibSqlBackend {
    async fn sync(&self) -> Result<()> {
        self.db.sync().await
    }

    async fn ping(&self) -> Result<()> {
        let conn = self.db.connect()?;
        conn.query("SELECT 1", ()).await?;
        Ok(())
    }
}
