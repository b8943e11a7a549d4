use crate::types::{AppError, Result};
use std::env;

/// Process-wide configuration, loaded once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub agents: AgentUrls,
    pub http: HttpConfig,
    /// Toggles the optional A2A RPC surface. Never changes HTTP semantics.
    pub a2a_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub orchestrator_port: u16,
    pub research_port: u16,
    pub synthesis_port: u16,
    pub verification_port: u16,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// One of: gemini, claude, openai, xai, ollama.
    pub provider: String,
    /// Resolved key for the selected provider. Empty for ollama.
    pub api_key: String,
    /// Model override; empty string means the provider default.
    pub model: String,
    pub ollama_url: String,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// One of: serper, serpapi.
    pub provider: String,
    pub serper_api_key: String,
    pub serpapi_api_key: String,
}

#[derive(Debug, Clone)]
pub struct AgentUrls {
    pub research_url: String,
    pub synthesis_url: String,
    pub verification_url: String,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Overall deadline for one orchestration request, in seconds.
    pub timeout_seconds: u64,
    /// Per-call deadline for worker invocations, in seconds.
    pub worker_timeout_seconds: u64,
    /// Per-request deadline for page fetches, in seconds.
    pub fetch_timeout_seconds: u64,
    /// Whether verification may fall back to an LLM fuzzy match.
    pub fuzzy_verification: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let llm_provider = get_env("LLM_PROVIDER", "gemini");
        let api_key = resolve_llm_api_key(&llm_provider);

        Ok(Config {
            server: ServerConfig {
                host: get_env("HOST", "0.0.0.0"),
                orchestrator_port: get_env_parsed("ORCHESTRATOR_PORT", 8000)?,
                research_port: get_env_parsed("RESEARCH_PORT", 8001)?,
                synthesis_port: get_env_parsed("SYNTHESIS_PORT", 8004)?,
                verification_port: get_env_parsed("VERIFICATION_PORT", 8002)?,
            },
            llm: LlmConfig {
                provider: llm_provider,
                api_key,
                model: get_env("LLM_MODEL", ""),
                ollama_url: get_env("OLLAMA_URL", "http://localhost:11434"),
            },
            search: SearchConfig {
                provider: get_env("SEARCH_PROVIDER", "serper"),
                serper_api_key: get_env("SERPER_API_KEY", ""),
                serpapi_api_key: get_env("SERPAPI_API_KEY", ""),
            },
            agents: AgentUrls {
                research_url: get_env("RESEARCH_AGENT_URL", "http://localhost:8001"),
                synthesis_url: get_env("SYNTHESIS_AGENT_URL", "http://localhost:8004"),
                verification_url: get_env("VERIFICATION_AGENT_URL", "http://localhost:8002"),
            },
            http: HttpConfig {
                timeout_seconds: get_env_parsed("HTTP_TIMEOUT_SECONDS", 300)?,
                worker_timeout_seconds: get_env_parsed("WORKER_TIMEOUT_SECONDS", 60)?,
                fetch_timeout_seconds: get_env_parsed("FETCH_TIMEOUT_SECONDS", 30)?,
                fuzzy_verification: get_env("VERIFY_FUZZY_ENABLED", "false") == "true",
            },
            a2a_enabled: get_env("A2A_ENABLED", "false") == "true",
        })
    }
}

/// Picks the API key for the selected provider. `LLM_API_KEY` always wins so a
/// deployment can inject a single secret regardless of provider.
fn resolve_llm_api_key(provider: &str) -> String {
    let explicit = get_env("LLM_API_KEY", "");
    if !explicit.is_empty() {
        return explicit;
    }

    match provider {
        "gemini" => get_env("GEMINI_API_KEY", &get_env("GOOGLE_API_KEY", "")),
        "claude" => get_env("CLAUDE_API_KEY", &get_env("ANTHROPIC_API_KEY", "")),
        "openai" => get_env("OPENAI_API_KEY", ""),
        "xai" => get_env("XAI_API_KEY", ""),
        _ => String::new(),
    }
}

fn get_env(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

fn get_env_parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => value
            .parse()
            .map_err(|_| AppError::Configuration(format!("{} is not a valid number", key))),
        _ => Ok(default),
    }
}
