use chrono::{DateTime, Utc};
use nanoid::nanoid;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

impl std::str::FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "assistant" | "bot" => Ok(Self::Assistant),
            _ => Err(format!("Unknown chat role: {s}")),
        }
    }
}

/// One persisted message in a user's conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub id: String,
    pub user_id: String,
    pub role: ChatRole,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(user_id: impl Into<String>, role: ChatRole, message: impl Into<String>) -> Self {
        Self {
            id: nanoid!(),
            user_id: user_id.into(),
            role,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == ChatRole::User
    }
}
