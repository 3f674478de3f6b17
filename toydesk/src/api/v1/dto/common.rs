//! Shared DTO types used across multiple v1 API endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{IndexStats, ScoredProduct};
use crate::context::{CacheState, CacheStatus, ContextState};

/// Freshness of the store documents behind a reply.
///
/// Wire format: `"fresh"`, `"stale"` or `"unavailable"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum V1ContextState {
    Fresh,
    /// The last refresh failed; documents are from an earlier load.
    Stale,
    /// No documents could be loaded; the reply was generated without them.
    Unavailable,
}

impl From<ContextState> for V1ContextState {
    fn from(state: ContextState) -> Self {
        match state {
            ContextState::Fresh => Self::Fresh,
            ContextState::Stale => Self::Stale,
            ContextState::Unavailable => Self::Unavailable,
        }
    }
}

/// A catalog product matched against the customer's message.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    /// Title-cased product name.
    pub name: String,
    pub url: String,
    pub score: u32,
}

impl From<ScoredProduct> for ProductResponse {
    fn from(scored: ScoredProduct) -> Self {
        Self {
            name: scored.product.display_name(),
            url: scored.product.url,
            score: scored.score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum V1CacheState {
    Empty,
    Valid,
    Expired,
}

impl From<CacheState> for V1CacheState {
    fn from(state: CacheState) -> Self {
        match state {
            CacheState::Empty => Self::Empty,
            CacheState::Valid => Self::Valid,
            CacheState::Expired => Self::Expired,
        }
    }
}

/// Snapshot of the context-document cache.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContextCacheResponse {
    pub status: V1CacheState,
    pub age_ms: i64,
    /// Zero once the entry has expired.
    pub time_to_expiry_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl From<CacheStatus> for ContextCacheResponse {
    fn from(status: CacheStatus) -> Self {
        Self {
            status: status.status.into(),
            age_ms: status.age_ms,
            time_to_expiry_ms: status.time_to_expiry_ms,
            last_modified: status.last_modified,
        }
    }
}

/// Snapshot of the in-memory product index.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductIndexResponse {
    pub indexed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub last_updated: Option<DateTime<Utc>>,
    pub cache_age_ms: i64,
}

impl From<IndexStats> for ProductIndexResponse {
    fn from(stats: IndexStats) -> Self {
        Self {
            indexed: stats.indexed,
            last_updated: stats.last_updated,
            cache_age_ms: stats.cache_age_ms,
        }
    }
}
