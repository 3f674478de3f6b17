mod common;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use common::{api_error_body, completion_body, llm_config};
use toydesk::config::LlmConfig;
use toydesk::error::ToydeskError;
use toydesk::llm::{CompletionOptions, LlmApiClient, LlmBackend, LlmProvider};

fn hosted(model: &str) -> LlmConfig {
    LlmConfig {
        model: model.to_string(),
        api_key: Some("test-key".to_string()),
        base_url: None,
        timeout_secs: 30,
        max_retries: 3,
        temperature: None,
        max_tokens: None,
    }
}

#[test]
fn test_openai_provider_detection() {
    let provider = LlmProvider::new(Some(&hosted("openai/gpt-4o")));

    assert!(matches!(provider.backend(), &LlmBackend::OpenAI));
    assert_eq!(provider.base_url(), Some("https://api.openai.com/v1"));
    assert_eq!(provider.model(), Some("gpt-4o"));
}

#[test]
fn test_openrouter_provider_detection() {
    let provider = LlmProvider::new(Some(&hosted("openrouter/openai/gpt-4o")));

    assert!(matches!(provider.backend(), &LlmBackend::OpenRouter));
    assert_eq!(provider.base_url(), Some("https://openrouter.ai/api/v1"));
    assert_eq!(provider.model(), Some("openai/gpt-4o"));
}

#[test]
fn test_ollama_needs_no_api_key() {
    let mut config = hosted("ollama/llama3.2");
    config.api_key = None;
    let provider = LlmProvider::new(Some(&config));

    assert!(provider.is_available());
    assert_eq!(provider.base_url(), Some("http://localhost:11434/v1"));
}

#[test]
fn test_hosted_provider_without_key_is_unavailable() {
    let mut config = hosted("openai/gpt-4o");
    config.api_key = None;

    assert!(matches!(
        LlmApiClient::new(&config, &LlmBackend::OpenAI),
        Err(ToydeskError::LlmUnavailable(_))
    ));
    assert!(!LlmProvider::new(Some(&config)).is_available());
}

#[tokio::test]
async fn test_complete_sends_system_and_user_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [
                { "role": "system", "content": "Be brief." },
                { "role": "user", "content": "Hello" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hi there")))
        .expect(1)
        .mount(&server)
        .await;

    let config = llm_config(format!("{}/v1", server.uri()), 1);
    let provider = LlmProvider::new(Some(&config));

    let reply = provider
        .complete_with_system("Be brief.", "Hello", None)
        .await
        .expect("completion should succeed");
    assert_eq!(reply, "Hi there");
}

#[tokio::test]
async fn test_configured_defaults_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({ "max_tokens": 800 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let config = llm_config(format!("{}/v1", server.uri()), 0);
    let provider = LlmProvider::new(Some(&config));

    let reply = provider.complete("Hello", None).await;
    assert_eq!(reply.expect("completion should succeed"), "ok");
}

#[tokio::test]
async fn test_per_call_options_override_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({ "max_tokens": 42 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("short")))
        .expect(1)
        .mount(&server)
        .await;

    let config = llm_config(format!("{}/v1", server.uri()), 0);
    let provider = LlmProvider::new(Some(&config));
    let options = CompletionOptions {
        max_tokens: Some(42),
        ..Default::default()
    };

    let reply = provider.complete("Hello", Some(&options)).await;
    assert_eq!(reply.expect("completion should succeed"), "short");
}

#[tokio::test]
async fn test_retry_on_server_error() {
    let server = MockServer::start().await;
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_for_mock = Arc::clone(&attempts);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(move |_request: &Request| {
            if attempts_for_mock.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(500).set_body_string("upstream temporary failure")
            } else {
                ResponseTemplate::new(200).set_body_json(completion_body("Recovered response"))
            }
        })
        .mount(&server)
        .await;

    let config = llm_config(format!("{}/v1", server.uri()), 2);
    let provider = LlmProvider::new(Some(&config));

    let result = provider.complete("Retry test", None).await;

    match result {
        Ok(value) => assert_eq!(value, "Recovered response"),
        Err(error) => panic!("Expected retry completion to succeed, got: {error}"),
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_rate_limit_handling() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(api_error_body(
                "Rate limit exceeded",
                "insufficient_quota",
                "insufficient_quota",
            )),
        )
        .mount(&server)
        .await;

    let config = llm_config(format!("{}/v1", server.uri()), 1);
    let provider = LlmProvider::new(Some(&config));

    let result = provider.complete("Rate limit test", None).await;

    assert!(matches!(
        result,
        Err(ToydeskError::LlmRateLimit { retry_after: None })
    ));
}

#[tokio::test]
async fn test_rejected_key_makes_assistant_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(api_error_body(
            "Invalid API key",
            "invalid_request_error",
            "invalid_api_key",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = llm_config(format!("{}/v1", server.uri()), 3);
    let provider = LlmProvider::new(Some(&config));

    match provider.complete("Auth test", None).await {
        Err(ToydeskError::LlmUnavailable(reason)) => {
            assert!(reason.contains("credentials rejected"));
        }
        other => panic!("Expected unavailable error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_bad_request_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(api_error_body(
            "maximum context length exceeded",
            "invalid_request_error",
            "context_length_exceeded",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = llm_config(format!("{}/v1", server.uri()), 3);
    let provider = LlmProvider::new(Some(&config));

    assert!(matches!(
        provider.complete("Hello", None).await,
        Err(ToydeskError::Llm(_))
    ));
}

#[tokio::test]
async fn test_persistent_server_error_gives_up_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(3)
        .mount(&server)
        .await;

    let config = llm_config(format!("{}/v1", server.uri()), 2);
    let provider = LlmProvider::new(Some(&config));

    assert!(matches!(
        provider.complete("Hello", None).await,
        Err(ToydeskError::Llm(_))
    ));
}

#[tokio::test]
async fn test_empty_content_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("   ")))
        .mount(&server)
        .await;

    let config = llm_config(format!("{}/v1", server.uri()), 0);
    let provider = LlmProvider::new(Some(&config));

    assert!(matches!(
        provider.complete("Hello", None).await,
        Err(ToydeskError::Llm(_))
    ));
}

#[tokio::test]
async fn test_empty_prompt_validation() {
    let provider = LlmProvider::new(Some(&hosted("openai/gpt-4o-mini")));

    let result = provider.complete("   ", None).await;

    assert!(matches!(result, Err(ToydeskError::Validation(_))));
}
