// Common test utilities for integration tests
#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Once};

use serde_json::json;
use toydesk::config::{ChatConfig, LlmConfig};
use toydesk::context::ContextDocuments;
use toydesk::db::{Database, DatabaseBackend, LibSqlBackend};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub const CATALOG: &str = "\
https://thegurtoys.com/products/gurtoy-push-car-rabbit-car-for-kids
https://thegurtoys.com/products/gurtoy-baby-doll-house
https://thegurtoys.com/products/gurtoy-kids-scooter
https://thegurtoys.com/products/gurtoy-red-remote-control-car
https://thegurtoys.com/products/gurtoy-musical-learning-piano-for-toddlers
https://thegurtoys.com/products/gurtoy-pink-princess-kitchen-set-for-girls";

pub fn documents() -> ContextDocuments {
    ContextDocuments {
        product: CATALOG.to_string(),
        contact: "WhatsApp us on +91 98765 43210".to_string(),
        privacy: "We never share your phone number.".to_string(),
        detail: "Free delivery on orders above Rs 999.".to_string(),
    }
}

/// Write the four reference documents into `dir`.
pub fn write_documents(dir: &Path, docs: &ContextDocuments) {
    for (name, text) in docs.named() {
        std::fs::write(dir.join(format!("{name}.txt")), text)
            .unwrap_or_else(|e| panic!("Failed to write {name}.txt: {e}"));
    }
}

pub async fn memory_backend() -> Arc<dyn DatabaseBackend> {
    let config = toydesk::config::DatabaseConfig::in_memory();
    let db = Database::new(&config)
        .await
        .expect("in-memory database should open");
    Arc::new(LibSqlBackend::new(db))
}

pub fn llm_config(base_url: String, max_retries: u32) -> LlmConfig {
    LlmConfig {
        model: "openai/gpt-4o-mini".to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url),
        timeout_secs: 5,
        max_retries,
        temperature: Some(0.7),
        max_tokens: Some(800),
    }
}

pub fn chat_config() -> ChatConfig {
    ChatConfig::default()
}

pub fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1,
        "model": "gpt-4o-mini",
        "choices": [
            {
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": content
                },
                "finish_reason": "stop"
            }
        ],
        "usage": {
            "prompt_tokens": 1,
            "completion_tokens": 1,
            "total_tokens": 2
        }
    })
}

pub fn api_error_body(message: &str, error_type: &str, code: &str) -> serde_json::Value {
    json!({
        "error": {
            "message": message,
            "type": error_type,
            "param": serde_json::Value::Null,
            "code": code
        }
    })
}
