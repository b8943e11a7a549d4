use crate::types::{AppError, Result};
use crate::utils::config::Config;
use async_trait::async_trait;
use std::sync::Arc;

/// Generic LLM client trait for provider abstraction.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with a system prompt.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier.
    fn model_name(&self) -> &str;
}

/// LLM provider configuration.
///
/// Use [`Provider::from_config`] to select based on the process configuration.
#[derive(Debug, Clone)]
pub enum Provider {
    /// Google Gemini via the Generative Language API.
    Gemini { api_key: String, model: String },

    /// Anthropic Claude via the Messages API.
    Claude { api_key: String, model: String },

    /// OpenAI chat completions.
    OpenAi { api_key: String, model: String },

    /// xAI Grok, served over the OpenAI-compatible chat API.
    Xai { api_key: String, model: String },

    /// Ollama local inference server.
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Select a provider from the loaded configuration.
    ///
    /// Remote providers require a resolved API key; a missing key is a startup
    /// failure, not something to discover on the first request.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let provider = cfg.llm.provider.as_str();
        let model = if cfg.llm.model.is_empty() {
            default_model(provider).to_string()
        } else {
            cfg.llm.model.clone()
        };

        if provider != "ollama" && cfg.llm.api_key.is_empty() {
            return Err(AppError::Configuration(format!(
                "no API key configured for LLM provider '{}'",
                provider
            )));
        }

        match provider {
            "gemini" => Ok(Provider::Gemini {
                api_key: cfg.llm.api_key.clone(),
                model,
            }),
            "claude" => Ok(Provider::Claude {
                api_key: cfg.llm.api_key.clone(),
                model,
            }),
            "openai" => Ok(Provider::OpenAi {
                api_key: cfg.llm.api_key.clone(),
                model,
            }),
            "xai" => Ok(Provider::Xai {
                api_key: cfg.llm.api_key.clone(),
                model,
            }),
            "ollama" => Ok(Provider::Ollama {
                base_url: cfg.llm.ollama_url.clone(),
                model,
            }),
            other => Err(AppError::Configuration(format!(
                "unknown LLM provider '{}' (expected gemini, claude, openai, xai, or ollama)",
                other
            ))),
        }
    }

    /// Create a shareable client for this provider. Constructed once per
    /// process and handed around as `Arc<dyn LLMClient>`.
    pub fn create_client(&self) -> Result<Arc<dyn LLMClient>> {
        match self {
            Provider::Gemini { api_key, model } => Ok(Arc::new(
                super::gemini::GeminiClient::new(api_key.clone(), model.clone())?,
            )),
            Provider::Claude { api_key, model } => Ok(Arc::new(
                super::claude::ClaudeClient::new(api_key.clone(), model.clone())?,
            )),
            Provider::OpenAi { api_key, model } => {
                Ok(Arc::new(super::openai::OpenAiCompatClient::new(
                    api_key.clone(),
                    "https://api.openai.com/v1".to_string(),
                    model.clone(),
                )?))
            }
            Provider::Xai { api_key, model } => {
                Ok(Arc::new(super::openai::OpenAiCompatClient::new(
                    api_key.clone(),
                    "https://api.x.ai/v1".to_string(),
                    model.clone(),
                )?))
            }
            Provider::Ollama { base_url, model } => Ok(Arc::new(
                super::ollama::OllamaClient::new(base_url.clone(), model.clone())?,
            )),
        }
    }

    /// Get the provider name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini { .. } => "gemini",
            Provider::Claude { .. } => "claude",
            Provider::OpenAi { .. } => "openai",
            Provider::Xai { .. } => "xai",
            Provider::Ollama { .. } => "ollama",
        }
    }

    /// Check if this provider requires an API key.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Provider::Ollama { .. })
    }
}

/// Default model per provider, used when `LLM_MODEL` is unset.
pub fn default_model(provider: &str) -> &'static str {
    match provider {
        "claude" => "claude-3-5-sonnet-20241022",
        "openai" => "gpt-4o-mini",
        "xai" => "grok-2-latest",
        "ollama" => "llama3.2",
        _ => "gemini-2.0-flash",
    }
}
