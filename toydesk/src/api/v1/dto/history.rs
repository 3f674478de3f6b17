//! Chat history DTOs for the v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ChatRole, ChatTurn};

/// Query parameters for `GET /v1/history/{userId}`.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Number of turns to return, newest ones kept. Clamped to `1..=100`,
    /// defaults to 20.
    pub limit: Option<u32>,
}

impl HistoryQuery {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum V1ChatRole {
    User,
    Assistant,
}

impl From<ChatRole> for V1ChatRole {
    fn from(role: ChatRole) -> Self {
        match role {
            ChatRole::User => Self::User,
            ChatRole::Assistant => Self::Assistant,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnResponse {
    pub id: String,
    pub role: V1ChatRole,
    pub message: String,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<ChatTurn> for ChatTurnResponse {
    fn from(turn: ChatTurn) -> Self {
        Self {
            id: turn.id,
            role: turn.role.into(),
            message: turn.message,
            created_at: turn.created_at,
        }
    }
}

/// Response for `GET /v1/history/{userId}`, oldest turn first.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub user_id: String,
    pub turns: Vec<ChatTurnResponse>,
}

/// Response for `DELETE /v1/history/{userId}`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearHistoryResponse {
    pub user_id: String,
    pub deleted: u64,
}
