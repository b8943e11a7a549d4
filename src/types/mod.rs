use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= Core Entities =============

/// A web source discovered by the research agent. Immutable once emitted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub snippet: String,
    /// Registrable part of the host, e.g. `ipcc.ch` or `nasa.gov`.
    pub domain: String,
}

/// An LLM-extracted numerical claim that has not yet been proven.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CandidateStatistic {
    pub name: String,
    /// Plain number, no grouping separators, no unit.
    pub value: f64,
    pub unit: String,
    /// Display name of the source, typically the domain.
    pub source: String,
    pub source_url: String,
    /// Substring claimed to appear verbatim in the fetched page body.
    pub excerpt: String,
}

/// A statistic that survived verification. The only entity surfaced to callers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Statistic {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub source: String,
    pub source_url: String,
    pub excerpt: String,
    pub verified: bool,
    pub date_found: DateTime<Utc>,
}

impl Statistic {
    /// Stamps a candidate with the outcome of its verification attempt.
    pub fn from_candidate(candidate: &CandidateStatistic, verified: bool) -> Self {
        Self {
            name: candidate.name.clone(),
            value: candidate.value,
            unit: candidate.unit.clone(),
            source: candidate.source.clone(),
            source_url: candidate.source_url.clone(),
            excerpt: candidate.excerpt.clone(),
            verified,
            date_found: Utc::now(),
        }
    }
}

/// The verification agent's verdict on a single candidate.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerificationResult {
    pub statistic: Statistic,
    pub verified: bool,
    /// Populated iff `verified` is false.
    #[serde(default)]
    pub reason: String,
}

// ============= API Request/Response Types =============

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrchestrationRequest {
    pub topic: String,
    /// Target number of verified statistics. Defaults to 10 when absent.
    #[serde(default)]
    pub min_verified_stats: Option<usize>,
    /// Upper bound on candidates across all research attempts. Defaults to 30.
    #[serde(default)]
    pub max_candidates: Option<usize>,
    #[serde(default = "default_reputable_only")]
    pub reputable_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrchestrationResponse {
    pub topic: String,
    pub statistics: Vec<Statistic>,
    pub total_candidates: usize,
    pub verified_count: usize,
    pub failed_count: usize,
    pub timestamp: DateTime<Utc>,
    /// True iff fewer statistics were verified than requested.
    pub partial: bool,
    pub target_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResearchRequest {
    pub topic: String,
    #[serde(default = "default_min_statistics")]
    pub min_statistics: usize,
    #[serde(default = "default_research_max")]
    pub max_statistics: usize,
    #[serde(default)]
    pub reputable_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResearchResponse {
    pub topic: String,
    pub search_results: Vec<SearchResult>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SynthesisRequest {
    pub topic: String,
    pub search_results: Vec<SearchResult>,
    #[serde(default = "default_min_statistics")]
    pub min_statistics: usize,
    #[serde(default = "default_synthesis_max")]
    pub max_statistics: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SynthesisResponse {
    pub topic: String,
    pub candidates: Vec<CandidateStatistic>,
    pub sources_analyzed: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerificationRequest {
    pub candidates: Vec<CandidateStatistic>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerificationResponse {
    pub results: Vec<VerificationResult>,
    pub verified_count: usize,
    pub failed_count: usize,
    pub timestamp: DateTime<Utc>,
}

fn default_reputable_only() -> bool {
    true
}

fn default_min_statistics() -> usize {
    5
}

fn default_research_max() -> usize {
    10
}

fn default_synthesis_max() -> usize {
    20
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Upstream returned malformed payload: {0}")]
    UpstreamMalformed(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            AppError::InvalidInput(_) => axum::http::StatusCode::BAD_REQUEST,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
