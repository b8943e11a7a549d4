//! The deterministic orchestration pipeline.
//!
//! Control flow is a fixed acyclic graph of typed transformations, not a loop
//! driven by LLM reasoning:
//!
//! ```text
//! ValidateInput -> Research -> Synthesis -> Verification -> QualityCheck
//!     -> (RetryResearch) -> FormatResponse
//! ```
//!
//! Each node is a function of the previous node's state. The retry edge
//! re-enters Research with a reduced candidate budget, bounded by attempt
//! count, by the overall candidate budget, and by zero-growth detection.
//! The pipeline always reaches FormatResponse; a shortfall against the target
//! is a `partial` response, never an error.

use crate::types::{
    AppError, CandidateStatistic, OrchestrationRequest, OrchestrationResponse, ResearchRequest,
    ResearchResponse, Result, SearchResult, Statistic, SynthesisRequest, SynthesisResponse,
    VerificationRequest, VerificationResponse,
};
use crate::utils::config::Config;
use crate::utils::httpclient::post_json_with_retry;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Total research attempts per request, the first included.
const MAX_RESEARCH_ATTEMPTS: usize = 3;
/// Additional attempts per worker call beyond the first.
const MAX_WORKER_RETRIES: u32 = 2;
/// Floor for the per-retry candidate budget.
const MIN_RETRY_BATCH: usize = 5;

/// A request that passed pre-flight validation, defaults applied.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub topic: String,
    pub min_verified_stats: usize,
    pub max_candidates: usize,
    pub reputable_only: bool,
}

/// State after the Research node.
struct ResearchState {
    search_results: Vec<SearchResult>,
}

/// State after the Synthesis node.
struct SynthesisState {
    candidates: Vec<CandidateStatistic>,
}

/// Accumulated state after Verification; the retry edge appends to it.
struct VerificationState {
    request: ValidatedRequest,
    all_candidates: Vec<CandidateStatistic>,
    verified: Vec<Statistic>,
    failed_count: usize,
}

/// Deterministic decision produced by the QualityCheck node.
struct QualityDecision {
    need_more: bool,
    shortfall: usize,
}

/// Executes the pipeline graph once per request. Holds no state between
/// requests; the reqwest pool is the only shared resource.
pub struct OrchestrationPipeline {
    cfg: Arc<Config>,
    client: reqwest::Client,
}

impl OrchestrationPipeline {
    pub fn new(cfg: Arc<Config>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.http.worker_timeout_seconds))
            .build()
            .map_err(|e| AppError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { cfg, client })
    }

    /// Run the graph to completion for one request.
    pub async fn orchestrate(&self, req: &OrchestrationRequest) -> Result<OrchestrationResponse> {
        let request = validate_input(req)?;
        let request_id = uuid::Uuid::new_v4();

        tracing::info!(
            component = "orchestration",
            request_id = %request_id,
            topic = %request.topic,
            target = request.min_verified_stats,
            max_candidates = request.max_candidates,
            "starting pipeline"
        );

        let mut state = VerificationState {
            request: request.clone(),
            all_candidates: Vec::new(),
            verified: Vec::new(),
            failed_count: 0,
        };

        // An explicit target of zero is already satisfied; skip the workers.
        if request.min_verified_stats == 0 {
            return Ok(format_response(state));
        }

        let deadline = Instant::now() + Duration::from_secs(self.cfg.http.timeout_seconds);
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for attempt in 1..=MAX_RESEARCH_ATTEMPTS {
            if Instant::now() >= deadline {
                tracing::warn!(
                    component = "orchestration",
                    request_id = %request_id,
                    attempt,
                    "overall deadline reached"
                );
                break;
            }

            let shortfall = request
                .min_verified_stats
                .saturating_sub(state.verified.len());
            let budget = if attempt == 1 {
                request.max_candidates
            } else {
                request
                    .max_candidates
                    .saturating_sub(state.all_candidates.len())
                    .max(MIN_RETRY_BATCH)
            };

            let research = match self
                .research_node(&request, shortfall, budget, attempt, deadline)
                .await
            {
                Ok(research) => research,
                Err(e) if attempt == 1 => {
                    // Nothing was produced yet, so there is nothing to salvage.
                    tracing::error!(
                        component = "orchestration",
                        request_id = %request_id,
                        stage = "research",
                        outcome = "failed",
                        error = %e,
                        "first research attempt failed"
                    );
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        component = "orchestration",
                        request_id = %request_id,
                        stage = "research",
                        attempt,
                        error = %e,
                        "retry research failed, keeping partial results"
                    );
                    break;
                }
            };

            let synthesis = match self
                .synthesis_node(&request, research, shortfall, budget, deadline)
                .await
            {
                Ok(synthesis) => synthesis,
                Err(e) => {
                    tracing::warn!(
                        component = "orchestration",
                        request_id = %request_id,
                        stage = "synthesis",
                        attempt,
                        error = %e,
                        "synthesis failed, keeping partial results"
                    );
                    break;
                }
            };

            // New candidates already seen under the same (source_url, excerpt)
            // pair are dropped before verification.
            let fresh: Vec<CandidateStatistic> = synthesis
                .candidates
                .into_iter()
                .filter(|c| seen.insert((c.source_url.clone(), c.excerpt.clone())))
                .collect();

            if fresh.is_empty() {
                tracing::info!(
                    component = "orchestration",
                    request_id = %request_id,
                    stage = "retry_research",
                    attempt,
                    "attempt produced zero new candidates"
                );
                break;
            }
            state.all_candidates.extend(fresh.iter().cloned());

            match self.verification_node(&fresh, deadline).await {
                Ok(resp) => {
                    for result in resp.results {
                        if result.verified {
                            state.verified.push(result.statistic);
                        } else {
                            state.failed_count += 1;
                        }
                    }
                }
                Err(e) => {
                    // The batch cannot be proven, so it counts as failed;
                    // verified_count + failed_count must always equal
                    // total_candidates in the response.
                    tracing::warn!(
                        component = "orchestration",
                        request_id = %request_id,
                        stage = "verification",
                        attempt,
                        error = %e,
                        "verification failed, keeping partial results"
                    );
                    state.failed_count += fresh.len();
                    break;
                }
            }

            let decision = quality_check(&state);
            if !decision.need_more {
                tracing::info!(
                    component = "orchestration",
                    request_id = %request_id,
                    stage = "quality_check",
                    verified = state.verified.len(),
                    "quality target met"
                );
                break;
            }
            if state.all_candidates.len() >= request.max_candidates {
                tracing::info!(
                    component = "orchestration",
                    request_id = %request_id,
                    stage = "quality_check",
                    "candidate budget exhausted"
                );
                break;
            }

            tracing::info!(
                component = "orchestration",
                request_id = %request_id,
                stage = "retry_research",
                shortfall = decision.shortfall,
                attempt,
                "retrying research"
            );
        }

        let response = format_response(state);
        tracing::info!(
            component = "orchestration",
            request_id = %request_id,
            verified = response.verified_count,
            failed = response.failed_count,
            total = response.total_candidates,
            partial = response.partial,
            outcome = "ok",
            "pipeline completed"
        );
        Ok(response)
    }

    async fn research_node(
        &self,
        request: &ValidatedRequest,
        shortfall: usize,
        budget: usize,
        attempt: usize,
        deadline: Instant,
    ) -> Result<ResearchState> {
        tracing::info!(
            component = "orchestration",
            stage = "research",
            topic = %request.topic,
            budget,
            attempt,
            "calling research agent"
        );

        let req = ResearchRequest {
            topic: request.topic.clone(),
            min_statistics: shortfall.clamp(1, budget.max(1)),
            max_statistics: budget,
            reputable_only: request.reputable_only,
        };

        let resp: ResearchResponse = post_json_with_retry(
            &self.client,
            &format!("{}/research", self.cfg.agents.research_url),
            &req,
            MAX_WORKER_RETRIES,
            deadline,
        )
        .await?;

        Ok(ResearchState {
            search_results: resp.search_results,
        })
    }

    async fn synthesis_node(
        &self,
        request: &ValidatedRequest,
        state: ResearchState,
        shortfall: usize,
        budget: usize,
        deadline: Instant,
    ) -> Result<SynthesisState> {
        tracing::info!(
            component = "orchestration",
            stage = "synthesis",
            topic = %request.topic,
            sources = state.search_results.len(),
            "calling synthesis agent"
        );

        let req = SynthesisRequest {
            topic: request.topic.clone(),
            search_results: state.search_results,
            min_statistics: shortfall.clamp(1, budget.max(1)),
            max_statistics: budget,
        };

        let resp: SynthesisResponse = post_json_with_retry(
            &self.client,
            &format!("{}/synthesize", self.cfg.agents.synthesis_url),
            &req,
            MAX_WORKER_RETRIES,
            deadline,
        )
        .await?;

        Ok(SynthesisState {
            candidates: resp.candidates,
        })
    }

    async fn verification_node(
        &self,
        candidates: &[CandidateStatistic],
        deadline: Instant,
    ) -> Result<VerificationResponse> {
        tracing::info!(
            component = "orchestration",
            stage = "verification",
            candidates = candidates.len(),
            "calling verification agent"
        );

        post_json_with_retry(
            &self.client,
            &format!("{}/verify", self.cfg.agents.verification_url),
            &VerificationRequest {
                candidates: candidates.to_vec(),
            },
            MAX_WORKER_RETRIES,
            deadline,
        )
        .await
    }
}

/// ValidateInput node: reject nonsense before any worker is called.
fn validate_input(req: &OrchestrationRequest) -> Result<ValidatedRequest> {
    let topic = req.topic.trim();
    if topic.is_empty() {
        return Err(AppError::InvalidInput("topic must not be empty".to_string()));
    }
    if topic.chars().count() > 500 {
        return Err(AppError::InvalidInput(
            "topic must be at most 500 characters".to_string(),
        ));
    }

    let min_verified_stats = req.min_verified_stats.unwrap_or(10);
    let max_candidates = req.max_candidates.unwrap_or(30);
    if max_candidates < min_verified_stats {
        return Err(AppError::InvalidInput(format!(
            "max_candidates ({}) must be at least min_verified_stats ({})",
            max_candidates, min_verified_stats
        )));
    }

    Ok(ValidatedRequest {
        topic: topic.to_string(),
        min_verified_stats,
        max_candidates,
        reputable_only: req.reputable_only,
    })
}

/// QualityCheck node: purely arithmetic, no I/O.
fn quality_check(state: &VerificationState) -> QualityDecision {
    let verified = state.verified.len();
    let target = state.request.min_verified_stats;

    QualityDecision {
        need_more: verified < target,
        shortfall: target.saturating_sub(verified),
    }
}

/// FormatResponse node: all verified statistics are returned, never truncated
/// to the target count.
fn format_response(state: VerificationState) -> OrchestrationResponse {
    let verified_count = state.verified.len();
    let target = state.request.min_verified_stats;

    OrchestrationResponse {
        topic: state.request.topic,
        statistics: state.verified,
        total_candidates: state.all_candidates.len(),
        verified_count,
        failed_count: state.failed_count,
        timestamp: Utc::now(),
        partial: verified_count < target,
        target_count: target,
    }
}
