//! Chat completions against an OpenAI-compatible endpoint.
//!
//! Every upstream failure is sorted into an [`Upstream`] class once, and that
//! class decides both whether the call is retried and which error the
//! customer-facing API reports (429, 502 or 503).

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
    Client,
};
use backoff::ExponentialBackoffBuilder;
use reqwest::StatusCode;

use crate::{
    config::{parse_llm_provider_model, LlmConfig},
    error::{Result, ToydeskError},
    llm::provider::{CompletionOptions, LlmBackend},
};

const FIRST_RETRY_DELAY: Duration = Duration::from_millis(100);

/// What went wrong upstream, from the point of view of a support chat.
#[derive(Debug, PartialEq, Eq)]
enum Upstream {
    /// Rate limit or exhausted quota.
    Throttled,
    /// The endpoint refused our credentials; nothing will work until the
    /// configuration changes.
    Rejected(String),
    /// 5xx, dropped connection or timeout.
    Transient(String),
    Failed(String),
}

impl Upstream {
    fn classify(error: OpenAIError) -> Self {
        match error {
            OpenAIError::Reqwest(err) => match err.status() {
                Some(StatusCode::TOO_MANY_REQUESTS) => Self::Throttled,
                Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                    Self::Rejected(err.to_string())
                }
                Some(status) if !status.is_server_error() => Self::Failed(err.to_string()),
                _ => Self::Transient(err.to_string()),
            },
            OpenAIError::ApiError(err) => Self::from_api_error(err),
            other => Self::Failed(other.to_string()),
        }
    }

    /// The client reports 5xx bodies as an `ApiError` with neither type nor
    /// code; everything else carries the provider's own classification.
    fn from_api_error(err: ApiError) -> Self {
        let kind = format!(
            "{} {}",
            err.r#type.as_deref().unwrap_or_default(),
            err.code.as_deref().unwrap_or_default()
        )
        .to_lowercase();
        let message = err.message.to_lowercase();

        if kind.contains("rate_limit")
            || kind.contains("insufficient_quota")
            || message.contains("rate limit")
        {
            Self::Throttled
        } else if kind.contains("invalid_api_key")
            || kind.contains("authentication")
            || message.contains("invalid api key")
        {
            Self::Rejected(err.message)
        } else if kind.trim().is_empty() {
            Self::Transient(err.message)
        } else {
            Self::Failed(err.message)
        }
    }
}

impl From<Upstream> for ToydeskError {
    fn from(upstream: Upstream) -> Self {
        match upstream {
            Upstream::Throttled => ToydeskError::LlmRateLimit { retry_after: None },
            Upstream::Rejected(detail) => {
                ToydeskError::LlmUnavailable(format!("LLM credentials rejected: {detail}"))
            }
            Upstream::Transient(detail) | Upstream::Failed(detail) => ToydeskError::Llm(detail),
        }
    }
}

/// OpenAI-compatible chat completion client, built once per provider.
#[derive(Clone)]
pub struct LlmApiClient {
    client: Client<OpenAIConfig>,
    base_url: String,
    model: String,
    max_retries: u32,
    defaults: CompletionOptions,
}

impl std::fmt::Debug for LlmApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmApiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl LlmApiClient {
    pub fn new(config: &LlmConfig, backend: &LlmBackend) -> Result<Self> {
        let (_, model) = parse_llm_provider_model(&config.model);

        if backend.requires_api_key() && config.api_key.is_none() {
            return Err(ToydeskError::LlmUnavailable(format!(
                "API key required for {backend}"
            )));
        }

        let base_url = config
            .base_url
            .clone()
            .or_else(|| backend.default_base_url().map(str::to_string))
            .ok_or_else(|| ToydeskError::LlmUnavailable(format!("No base URL for {backend}")))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| ToydeskError::Llm(format!("Failed to build HTTP client: {error}")))?;

        // Retries happen in `complete`; the client's own backoff gives up at once.
        let no_inner_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        let client = Client::with_config(
            OpenAIConfig::new()
                .with_api_base(base_url.clone())
                .with_api_key(config.api_key.clone().unwrap_or_default()),
        )
        .with_http_client(http_client)
        .with_backoff(no_inner_retry);

        Ok(Self {
            client,
            base_url,
            model: model.to_string(),
            max_retries: config.max_retries,
            defaults: CompletionOptions {
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            },
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One reply for `prompt`, optionally preceded by a system message.
    ///
    /// Transient failures are retried up to `max_retries` times, doubling the
    /// delay from 100ms. Throttling and rejected credentials fail at once.
    pub async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: Option<&CompletionOptions>,
    ) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(ToydeskError::Validation("Prompt cannot be empty".to_string()));
        }

        let request = self.build_request(prompt, system_prompt, options)?;
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(FIRST_RETRY_DELAY)
            .with_multiplier(2.0)
            .with_randomization_factor(0.0)
            .with_max_elapsed_time(None)
            .build();

        let attempts = AtomicU32::new(0);
        let attempts = &attempts;
        let request = &request;
        let max_retries = self.max_retries;

        backoff::future::retry(policy, move || async move {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed);
            match self.client.chat().create(request.clone()).await {
                Ok(response) => reply_text(response).map_err(backoff::Error::permanent),
                Err(error) => match Upstream::classify(error) {
                    Upstream::Transient(detail) if attempt < max_retries => {
                        tracing::warn!(attempt, error = %detail, "LLM call failed, retrying");
                        Err(backoff::Error::transient(ToydeskError::Llm(detail)))
                    }
                    other => Err(backoff::Error::permanent(other.into())),
                },
            }
        })
        .await
    }

    fn build_request(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: Option<&CompletionOptions>,
    ) -> Result<CreateChatCompletionRequest> {
        let invalid = |error: OpenAIError| ToydeskError::Validation(error.to_string());

        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(2);
        if let Some(system) = system_prompt.filter(|value| !value.trim().is_empty()) {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()
                    .map_err(invalid)?
                    .into(),
            );
        }
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(invalid)?
                .into(),
        );

        let options = options.unwrap_or(&self.defaults);
        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(self.model.clone()).messages(messages);
        if let Some(temperature) = options.temperature.or(self.defaults.temperature) {
            request.temperature(temperature);
        }
        if let Some(max_tokens) = options.max_tokens.or(self.defaults.max_tokens) {
            request.max_tokens(max_tokens);
        }

        request.build().map_err(invalid)
    }
}

fn reply_text(response: CreateChatCompletionResponse) -> Result<String> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ToydeskError::Llm("LLM returned an empty reply".to_string()));
    }
    Ok(text)
}
