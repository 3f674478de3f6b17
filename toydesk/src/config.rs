use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

/// Parse a comma-separated env var into trimmed, non-empty entries.
fn parse_env_list(var: &str) -> Vec<String> {
    env::var(var)
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: Option<LlmConfig>,
    pub catalog: CatalogConfig,
    pub context: ContextConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bearer keys accepted on `/admin/*` routes. Empty locks the admin surface.
    pub admin_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    /// Local replica file when `url` points at a remote libsql server.
    pub local_path: Option<String>,
    pub busy_timeout_ms: u64,
    pub journal_mode: String,
    pub synchronous: String,
}

impl DatabaseConfig {
    /// Private in-memory database, used by tests and the CLI diagnostics.
    pub fn in_memory() -> Self {
        Self {
            url: ":memory:".to_string(),
            auth_token: None,
            local_path: None,
            busy_timeout_ms: 5000,
            journal_mode: "MEMORY".to_string(),
            synchronous: "OFF".to_string(),
        }
    }
}

/// LLM configuration for chat/completion models
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Product catalog parsing and index caching.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Lines not starting with this prefix are ignored.
    pub url_prefix: String,
    /// Leading slug token stripped when deriving the product name.
    pub brand_prefix: String,
    pub index_ttl_secs: u64,
    /// Number of products injected into the prompt.
    pub context_limit: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url_prefix: "https://thegurtoys.com/products/".to_string(),
            brand_prefix: "gurtoy".to_string(),
            index_ttl_secs: 600,
            context_limit: 8,
        }
    }
}

/// Reference-document loading and caching.
#[derive(Debug, Clone, Deserialize)]
pub struct ContextConfig {
    /// Directory holding `product.txt`, `contact.txt`, `privacy.txt`, `detail.txt`.
    pub dir: String,
    /// When set, documents are fetched from `{base_url}/{name}.txt` instead of `dir`.
    pub base_url: Option<String>,
    pub ttl_secs: u64,
    pub load_timeout_secs: u64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            dir: "data/context".to_string(),
            base_url: None,
            ttl_secs: 300,
            load_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Turns read from the history store per request.
    pub history_limit: u32,
    /// Turns rendered verbatim in the memory block.
    pub recent_turns: usize,
    /// Per-turn preview length in the memory block.
    pub preview_chars: usize,
    pub max_message_chars: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_limit: 20,
            recent_turns: 10,
            preview_chars: 100,
            max_message_chars: 2000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let catalog_defaults = CatalogConfig::default();
        let context_defaults = ContextConfig::default();
        let chat_defaults = ChatConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("TOYDESK_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("TOYDESK_PORT", 3000),
                admin_keys: parse_env_list("TOYDESK_ADMIN_KEYS"),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:toydesk.db".to_string()),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
                local_path: env::var("DATABASE_LOCAL_PATH").ok(),
                busy_timeout_ms: parse_env_or("DATABASE_BUSY_TIMEOUT_MS", 5000),
                journal_mode: env::var("DATABASE_JOURNAL_MODE")
                    .unwrap_or_else(|_| "WAL".to_string()),
                synchronous: env::var("DATABASE_SYNCHRONOUS")
                    .unwrap_or_else(|_| "NORMAL".to_string()),
            },
            llm: env::var("LLM_MODEL").ok().map(|model| LlmConfig {
                model,
                api_key: env::var("LLM_API_KEY").ok(),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 30),
                max_retries: parse_env_or("LLM_MAX_RETRIES", 3),
                temperature: parse_env_opt("LLM_TEMPERATURE").or(Some(0.7)),
                max_tokens: parse_env_opt("LLM_MAX_TOKENS").or(Some(800)),
            }),
            catalog: CatalogConfig {
                url_prefix: env::var("CATALOG_URL_PREFIX")
                    .unwrap_or(catalog_defaults.url_prefix),
                brand_prefix: env::var("CATALOG_BRAND_PREFIX")
                    .unwrap_or(catalog_defaults.brand_prefix),
                index_ttl_secs: parse_env_or(
                    "PRODUCT_INDEX_TTL_SECS",
                    catalog_defaults.index_ttl_secs,
                ),
                context_limit: parse_env_or(
                    "PRODUCT_CONTEXT_LIMIT",
                    catalog_defaults.context_limit,
                ),
            },
            context: ContextConfig {
                dir: env::var("CONTEXT_DIR").unwrap_or(context_defaults.dir),
                base_url: env::var("CONTEXT_BASE_URL")
                    .ok()
                    .filter(|url| !url.trim().is_empty()),
                ttl_secs: parse_env_or("CONTEXT_CACHE_TTL_SECS", context_defaults.ttl_secs),
                load_timeout_secs: parse_env_or(
                    "CONTEXT_LOAD_TIMEOUT_SECS",
                    context_defaults.load_timeout_secs,
                ),
            },
            chat: ChatConfig {
                history_limit: parse_env_or("CHAT_HISTORY_LIMIT", chat_defaults.history_limit),
                recent_turns: parse_env_or("MEMORY_RECENT_TURNS", chat_defaults.recent_turns),
                preview_chars: parse_env_or("MEMORY_PREVIEW_CHARS", chat_defaults.preview_chars),
                max_message_chars: parse_env_or(
                    "CHAT_MAX_MESSAGE_CHARS",
                    chat_defaults.max_message_chars,
                ),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}
