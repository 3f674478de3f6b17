use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{params, Connection};

use crate::error::{Result, ToydeskError};
use crate::models::{ChatRole, ChatTurn};

pub struct ChatHistoryRepository;

impl ChatHistoryRepository {
    pub async fn insert(conn: &Connection, turn: &ChatTurn) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO chat_history (id, user_id, role, message, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                turn.id.clone(),
                turn.user_id.clone(),
                turn.role.to_string(),
                turn.message.clone(),
                format_timestamp(&turn.created_at),
            ],
        )
        .await?;

        Ok(())
    }

    /// Up to `limit` turns for `user_id`, newest first.
    pub async fn recent(conn: &Connection, user_id: &str, limit: u32) -> Result<Vec<ChatTurn>> {
        let mut rows = conn
            .query(
                r#"
                SELECT id, user_id, role, message, created_at
                FROM chat_history
                WHERE user_id = ?1
                ORDER BY created_at DESC, rowid DESC
                LIMIT ?2
                "#,
                params![user_id, i64::from(limit)],
            )
            .await?;

        let mut turns = Vec::new();
        while let Some(row) = rows.next().await? {
            turns.push(Self::row_to_turn(&row)?);
        }

        Ok(turns)
    }

    pub async fn delete_for_user(conn: &Connection, user_id: &str) -> Result<u64> {
        let deleted = conn
            .execute(
                "DELETE FROM chat_history WHERE user_id = ?1",
                params![user_id],
            )
            .await?;
        Ok(deleted)
    }

    fn row_to_turn(row: &libsql::Row) -> Result<ChatTurn> {
        let role: String = row.get(2)?;
        Ok(ChatTurn {
            id: row.get(0)?,
            user_id: row.get(1)?,
            role: role.parse::<ChatRole>().map_err(ToydeskError::Internal)?,
            message: row.get(3)?,
            created_at: DateTime::parse_from_rfc3339(&row.get::<String>(4)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
