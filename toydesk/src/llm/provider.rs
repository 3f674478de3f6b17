use std::sync::Arc;

use crate::config::{parse_llm_provider_model, LlmConfig};
use crate::error::{Result, ToydeskError};
use crate::llm::api::LlmApiClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAI,
    OpenRouter,
    Ollama,
    LmStudio,
    OpenAICompatible { base_url: String },
    Unavailable { reason: String },
}

impl std::fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::OpenRouter => write!(f, "openrouter"),
            Self::Ollama => write!(f, "ollama"),
            Self::LmStudio => write!(f, "lmstudio"),
            Self::OpenAICompatible { .. } => write!(f, "openai-compatible"),
            Self::Unavailable { .. } => write!(f, "unavailable"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl LlmBackend {
    /// Endpoint used when `LLM_BASE_URL` is not set.
    pub fn default_base_url(&self) -> Option<&str> {
        match self {
            Self::OpenAI => Some("https://api.openai.com/v1"),
            Self::OpenRouter => Some("https://openrouter.ai/api/v1"),
            Self::Ollama => Some("http://localhost:11434/v1"),
            Self::LmStudio => Some("http://localhost:1234/v1"),
            Self::OpenAICompatible { base_url } => Some(base_url.as_str()),
            Self::Unavailable { .. } => None,
        }
    }

    /// Hosted services need a key; local servers usually do not.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::OpenRouter)
    }
}

/// The chat model behind support replies.
///
/// Resolves the backend from the `provider/model` prefix and builds the HTTP
/// client once. A provider that cannot be built reports itself unavailable
/// instead of failing startup.
#[derive(Debug, Clone)]
pub struct LlmProvider {
    backend: LlmBackend,
    config: Option<Arc<LlmConfig>>,
    client: Option<Arc<LlmApiClient>>,
}

impl LlmProvider {
    pub fn new(config: Option<&LlmConfig>) -> Self {
        let Some(config) = config else {
            return Self::unavailable("No LLM configuration provided");
        };

        let (provider, _model) = parse_llm_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "openai" => LlmBackend::OpenAI,
            "openrouter" => LlmBackend::OpenRouter,
            "ollama" => LlmBackend::Ollama,
            "lmstudio" => LlmBackend::LmStudio,
            _ => match &config.base_url {
                Some(base_url) => LlmBackend::OpenAICompatible {
                    base_url: base_url.clone(),
                },
                None => {
                    return Self::unavailable(&format!(
                        "Unknown provider in model '{}' and no LLM_BASE_URL set",
                        config.model
                    ))
                }
            },
        };

        match LlmApiClient::new(config, &backend) {
            Ok(client) => {
                tracing::info!(
                    backend = %backend,
                    model = %client.model(),
                    "LLM provider configured"
                );
                Self {
                    backend,
                    config: Some(Arc::new(config.clone())),
                    client: Some(Arc::new(client)),
                }
            }
            Err(error) => {
                tracing::warn!(error = %error, "LLM provider unavailable");
                Self::unavailable(&error.to_string())
            }
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: LlmBackend::Unavailable {
                reason: reason.to_string(),
            },
            config: None,
            client: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some() && !matches!(self.backend, LlmBackend::Unavailable { .. })
    }

    pub fn backend(&self) -> &LlmBackend {
        &self.backend
    }

    pub fn config(&self) -> Option<&LlmConfig> {
        self.config.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.client.as_deref().map(LlmApiClient::model)
    }

    pub fn base_url(&self) -> Option<&str> {
        self.client.as_deref().map(LlmApiClient::base_url)
    }

    pub async fn complete(
        &self,
        prompt: &str,
        options: Option<&CompletionOptions>,
    ) -> Result<String> {
        self.client()?.complete(prompt, None, options).await
    }

    /// Completion with a system message ahead of the user message.
    pub async fn complete_with_system(
        &self,
        system_prompt: &str,
        prompt: &str,
        options: Option<&CompletionOptions>,
    ) -> Result<String> {
        self.client()?
            .complete(prompt, Some(system_prompt), options)
            .await
    }

    fn client(&self) -> Result<&LlmApiClient> {
        self.client
            .as_deref()
            .ok_or_else(|| ToydeskError::LlmUnavailable(self.unavailable_reason()))
    }

    fn unavailable_reason(&self) -> String {
        match &self.backend {
            LlmBackend::Unavailable { reason } => reason.clone(),
            _ => "LLM client was not initialised".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(model: &str) -> LlmConfig {
        LlmConfig {
            model: model.to_string(),
            api_key: Some("sk-test".to_string()),
            base_url: None,
            timeout_secs: 5,
            max_retries: 0,
            temperature: None,
            max_tokens: None,
        }
    }

    #[test]
    fn test_missing_config_is_unavailable() {
        let provider = LlmProvider::new(None);
        assert!(!provider.is_available());
        assert_eq!(provider.backend().to_string(), "unavailable");
    }

    #[test]
    fn test_known_prefixes_resolve() {
        assert_eq!(
            LlmProvider::new(Some(&config("openrouter/meta/llama-3"))).backend(),
            &LlmBackend::OpenRouter
        );
        assert_eq!(
            LlmProvider::new(Some(&config("lmstudio/phi"))).backend(),
            &LlmBackend::LmStudio
        );
    }

    #[test]
    fn test_unknown_prefix_needs_base_url() {
        let provider = LlmProvider::new(Some(&config("mystery-model")));
        assert!(!provider.is_available());

        let mut with_url = config("mystery-model");
        with_url.base_url = Some("http://localhost:9000/v1".to_string());
        let provider = LlmProvider::new(Some(&with_url));
        assert!(provider.is_available());
        assert_eq!(provider.model(), Some("mystery-model"));
    }

    #[tokio::test]
    async fn test_unavailable_provider_errors_on_complete() {
        let provider = LlmProvider::unavailable("offline");
        let err = provider.complete("hi", None).await.unwrap_err();
        match err {
            ToydeskError::LlmUnavailable(reason) => assert_eq!(reason, "offline"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
