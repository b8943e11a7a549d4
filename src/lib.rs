//! veristat - a team of cooperating agents that finds verifiable numerical
//! statistics on a topic and proves each one against the bytes of its cited
//! source.
//!
//! Four services share this crate, selected by the binary's role argument:
//! the orchestrator drives a deterministic pipeline graph over the research,
//! synthesis, and verification workers, enforcing a quality target with
//! bounded retry. Workers are pure functions over their inputs and never
//! call each other.

pub mod agents;
pub mod api;
pub mod llm;
pub mod orchestration;
pub mod search;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use llm::{LLMClient, Provider};
pub use orchestration::OrchestrationPipeline;
pub use search::SearchProvider;
pub use types::{AppError, Result};
