use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::loader::{ContextDocuments, ContextLoader};
use crate::clock::Clock;
use crate::config::ContextConfig;

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Arc<ContextDocuments>,
    cached_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextLookup {
    /// Served from a valid entry or a load that just succeeded.
    Fresh(Arc<ContextDocuments>),
    /// The refresh failed and the last good documents were served instead.
    Stale(Arc<ContextDocuments>),
    /// The refresh failed and nothing was cached.
    Unavailable,
}

impl ContextLookup {
    pub fn documents(&self) -> Option<&Arc<ContextDocuments>> {
        match self {
            Self::Fresh(docs) | Self::Stale(docs) => Some(docs),
            Self::Unavailable => None,
        }
    }

    pub fn state(&self) -> ContextState {
        match self {
            Self::Fresh(_) => ContextState::Fresh,
            Self::Stale(_) => ContextState::Stale,
            Self::Unavailable => ContextState::Unavailable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextState {
    Fresh,
    Stale,
    Unavailable,
}

impl std::fmt::Display for ContextState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fresh => write!(f, "fresh"),
            Self::Stale => write!(f, "stale"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    Empty,
    Valid,
    Expired,
}

impl std::fmt::Display for CacheState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Valid => write!(f, "valid"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub status: CacheState,
    pub age_ms: i64,
    /// Zero once expired.
    pub time_to_expiry_ms: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// TTL cache around a [`ContextLoader`] with stale-if-error fallback.
///
/// The entry is replaced only after a load succeeds, so a failing, slow or
/// timed-out loader leaves the previous entry untouched. The lock is never
/// held across the load; concurrent misses may load twice.
pub struct ContextCache {
    ttl: Duration,
    load_timeout: std::time::Duration,
    clock: Arc<dyn Clock>,
    entry: Mutex<Option<CacheEntry>>,
}

impl ContextCache {
    pub fn new(ttl: Duration, load_timeout: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            load_timeout,
            clock,
            entry: Mutex::new(None),
        }
    }

    pub fn from_config(config: &ContextConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Duration::seconds(i64::try_from(config.ttl_secs).unwrap_or(i64::MAX)),
            std::time::Duration::from_secs(config.load_timeout_secs),
            clock,
        )
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached documents if still valid, otherwise the result of `loader`.
    pub async fn get_or_load(&self, loader: &dyn ContextLoader) -> ContextLookup {
        let previous = self.snapshot();
        if let Some(entry) = previous.as_ref() {
            if self.clock.now() < entry.expires_at {
                return ContextLookup::Fresh(Arc::clone(&entry.data));
            }
        }

        let failure = match tokio::time::timeout(self.load_timeout, loader.load()).await {
            Ok(Ok(Some(docs))) => return ContextLookup::Fresh(self.store(docs)),
            Ok(Ok(None)) => "loader returned no documents".to_string(),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("load timed out after {:?}", self.load_timeout),
        };

        match previous {
            Some(entry) => {
                tracing::warn!(
                    source = %loader.describe(),
                    error = %failure,
                    cached_at = %entry.cached_at,
                    "Context refresh failed, serving stale documents"
                );
                ContextLookup::Stale(entry.data)
            }
            None => {
                tracing::error!(
                    source = %loader.describe(),
                    error = %failure,
                    "Context documents unavailable"
                );
                ContextLookup::Unavailable
            }
        }
    }

    pub fn clear(&self) {
        let mut guard = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
        tracing::info!("Context cache cleared");
    }

    pub fn status(&self) -> CacheStatus {
        let now = self.clock.now();
        match self.snapshot() {
            None => CacheStatus {
                status: CacheState::Empty,
                age_ms: 0,
                time_to_expiry_ms: 0,
                last_modified: None,
            },
            Some(entry) => CacheStatus {
                status: if now < entry.expires_at {
                    CacheState::Valid
                } else {
                    CacheState::Expired
                },
                age_ms: (now - entry.cached_at).num_milliseconds().max(0),
                time_to_expiry_ms: (entry.expires_at - now).num_milliseconds().max(0),
                last_modified: Some(entry.cached_at),
            },
        }
    }

    fn snapshot(&self) -> Option<CacheEntry> {
        self.entry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, docs: ContextDocuments) -> Arc<ContextDocuments> {
        let now = self.clock.now();
        let data = Arc::new(docs);
        let entry = CacheEntry {
            data: Arc::clone(&data),
            cached_at: now,
            expires_at: now + self.ttl,
        };

        let mut guard = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(entry);
        tracing::debug!(expires_at = %(now + self.ttl), "Context documents cached");
        data
    }
}
