use libsql::{Builder, Connection};
use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::error::Result;

use super::schema;

/// Handle to the chat-history database.
///
/// Remote (`libsql://`, `https://`) URLs open a remote connection, or an
/// embedded replica when `local_path` is set. `:memory:` databases hand out
/// clones of one connection, since every fresh SQLite connection to
/// `:memory:` would see its own empty database.
#[derive(Clone)]
pub struct Database {
    db: Arc<libsql::Database>,
    shared: Option<Connection>,
    pragmas: Pragmas,
}

#[derive(Debug, Clone)]
struct Pragmas {
    busy_timeout_ms: u64,
    journal_mode: &'static str,
    synchronous: &'static str,
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let pragmas = Pragmas {
            busy_timeout_ms: config.busy_timeout_ms,
            journal_mode: normalize_journal_mode(&config.journal_mode),
            synchronous: normalize_synchronous(&config.synchronous),
        };

        let is_remote = config.url.starts_with("libsql://") || config.url.starts_with("https://");
        let path = config.url.strip_prefix("file:").unwrap_or(&config.url);
        let in_memory = !is_remote && path == ":memory:";

        let db = if is_remote {
            let token = config.auth_token.clone().unwrap_or_default();
            match config.local_path {
                Some(ref local_path) => {
                    Builder::new_remote_replica(local_path, config.url.clone(), token)
                        .build()
                        .await?
                }
                None => Builder::new_remote(config.url.clone(), token).build().await?,
            }
        } else {
            Builder::new_local(path).build().await?
        };

        let shared = if in_memory { Some(db.connect()?) } else { None };

        let database = Self {
            db: Arc::new(db),
            shared,
            pragmas,
        };
        if !is_remote {
            database.configure_pragmas().await?;
        }
        database.init_schema().await?;

        tracing::info!(url = %redact(&config.url), in_memory, "Database ready");
        Ok(database)
    }

    pub fn connect(&self) -> Result<Connection> {
        match &self.shared {
            Some(conn) => Ok(conn.clone()),
            None => Ok(self.db.connect()?),
        }
    }

    async fn configure_pragmas(&self) -> Result<()> {
        let conn = self.connect()?;
        let statements = [
            format!("PRAGMA busy_timeout = {}", self.pragmas.busy_timeout_ms),
            format!("PRAGMA journal_mode = {}", self.pragmas.journal_mode),
            format!("PRAGMA synchronous = {}", self.pragmas.synchronous),
        ];

        for sql in statements {
            if let Err(error) = conn.execute_batch(&sql).await {
                tracing::warn!(sql = %sql, error = %error, "Failed to apply SQLite pragma");
            }
        }

        Ok(())
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        schema::init_schema(&conn).await
    }

    /// Pull from the primary when running as an embedded replica.
    pub async fn sync(&self) -> Result<()> {
        if let Ok(sync) = self.db.sync().await {
            tracing::debug!("Database synced: {:?}", sync);
        }
        Ok(())
    }
}

/// Drop any userinfo or query string before logging a database URL.
fn redact(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) if parsed.scheme() != "file" && parsed.has_host() => {
            format!("{}://{}", parsed.scheme(), parsed.host_str().unwrap_or_default())
        }
        _ => url.to_string(),
    }
}

fn normalize_journal_mode(value: &str) -> &'static str {
    match value.trim().to_uppercase().as_str() {
        "DELETE" => "DELETE",
        "TRUNCATE" => "TRUNCATE",
        "PERSIST" => "PERSIST",
        "MEMORY" => "MEMORY",
        "OFF" => "OFF",
        _ => "WAL",
    }
}

fn normalize_synchronous(value: &str) -> &'static str {
    match value.trim().to_uppercase().as_str() {
        "OFF" => "OFF",
        "FULL" => "FULL",
        "EXTRA" => "EXTRA",
        _ => "NORMAL",
    }
}
