//! LLM provider clients and abstractions.
//!
//! A unified [`LLMClient`] trait fronts every supported provider; the
//! [`Provider`] enum selects and constructs the concrete client from
//! configuration. The client is built once per process and shared read-only
//! across agents.
//!
//! # Supported providers
//!
//! - `gemini` - Google Generative Language API (the default)
//! - `claude` - Anthropic Messages API
//! - `openai` - OpenAI chat completions
//! - `xai` - Grok via the OpenAI-compatible endpoint
//! - `ollama` - local Ollama server, no API key required

/// Core LLM client trait and provider selection.
pub mod client;

pub mod claude;
pub mod gemini;
pub mod ollama;
pub mod openai;

pub use client::{default_model, LLMClient, Provider};
