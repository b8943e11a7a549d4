//! Verification agent: proves or rejects candidate statistics against the
//! bytes of their cited sources.
//!
//! A candidate verifies iff its excerpt occurs verbatim in the fetched body
//! and some textual form of its value occurs within a context window around
//! the first excerpt match. Nothing else about the candidate is trusted.

use crate::llm::LLMClient;
use crate::types::{
    AppError, CandidateStatistic, Result, Statistic, VerificationRequest, VerificationResponse,
    VerificationResult,
};
use crate::utils::fetch::PageFetcher;
use crate::utils::numeric::value_occurs_in;
use chrono::Utc;
use futures::StreamExt;
use serde::Deserialize;
use std::sync::Arc;

/// Characters inspected either side of the excerpt match for the value.
const CONTEXT_RADIUS: usize = 500;
/// In-flight source fetches per request.
const VERIFY_CONCURRENCY: usize = 5;
/// Body prefix handed to the fuzzy fallback prompt.
const FUZZY_PREFIX_LEN: usize = 5000;

pub struct VerificationAgent {
    fetcher: PageFetcher,
    /// Present only when the LLM fuzzy fallback is enabled.
    llm: Option<Arc<dyn LLMClient>>,
}

#[derive(Debug, Deserialize)]
struct FuzzyVerdict {
    #[serde(default)]
    verified: bool,
    #[serde(default)]
    reason: String,
}

impl VerificationAgent {
    pub fn new(fetcher: PageFetcher, llm: Option<Arc<dyn LLMClient>>) -> Self {
        Self { fetcher, llm }
    }

    /// Verify every candidate independently. Results preserve input order and
    /// a candidate that fails to verify is a row, never an error.
    pub async fn verify(&self, req: &VerificationRequest) -> Result<VerificationResponse> {
        tracing::info!(
            component = "verification",
            candidates = req.candidates.len(),
            "verifying candidates"
        );

        let results: Vec<VerificationResult> = futures::stream::iter(req.candidates.clone())
            .map(|candidate| verify_candidate(self.fetcher.clone(), self.llm.clone(), candidate))
            .buffered(VERIFY_CONCURRENCY)
            .collect()
            .await;

        let verified_count = results.iter().filter(|r| r.verified).count();
        let failed_count = results.len() - verified_count;

        tracing::info!(
            component = "verification",
            verified = verified_count,
            failed = failed_count,
            outcome = "ok",
            "verification completed"
        );

        Ok(VerificationResponse {
            results,
            verified_count,
            failed_count,
            timestamp: Utc::now(),
        })
    }

}

async fn verify_candidate(
    fetcher: PageFetcher,
    llm: Option<Arc<dyn LLMClient>>,
    candidate: CandidateStatistic,
) -> VerificationResult {
    let body = match fetcher.fetch(&candidate.source_url).await {
        Ok(body) => body,
        Err(e) => {
            let detail = match e {
                AppError::Fetch(detail) => detail,
                other => other.to_string(),
            };
            tracing::warn!(
                component = "verification",
                url = %candidate.source_url,
                error = %detail,
                "failed to fetch source"
            );
            return failure(&candidate, format!("Failed to fetch source: {}", detail));
        }
    };

    match body.find(&candidate.excerpt) {
        Some(index) => {
            let window = context_window(&body, index, candidate.excerpt.len());
            if value_occurs_in(window, candidate.value) {
                success(&candidate)
            } else {
                failure(&candidate, "Value not found in excerpt context".to_string())
            }
        }
        None => fuzzy_fallback(llm, &candidate, &body).await,
    }
}

/// Optional LLM fallback for excerpts that do not occur verbatim. Gated
/// behind a substring check for the numeric value so a hallucinated
/// excerpt can never drag a hallucinated number through with it.
async fn fuzzy_fallback(
    llm: Option<Arc<dyn LLMClient>>,
    candidate: &CandidateStatistic,
    body: &str,
) -> VerificationResult {
    let Some(llm) = &llm else {
        return failure(candidate, "Excerpt not found in source content".to_string());
    };

    if !value_occurs_in(body, candidate.value) {
        return failure(candidate, "Excerpt not found in source content".to_string());
    }

    let prefix = crate::utils::fetch::truncate_content(body, FUZZY_PREFIX_LEN);
    let prompt = format!(
        r#"Verify whether this statistic is substantively present in the source content:

Statistic: {name}
Value: {value}
Claimed excerpt: "{excerpt}"

Source content (truncated):
{prefix}

Return JSON only: {{"verified": true/false, "reason": "explanation"}}"#,
        name = candidate.name,
        value = candidate.value,
        excerpt = candidate.excerpt,
        prefix = prefix,
    );

    match llm.generate(&prompt).await {
        Ok(response) => match parse_fuzzy_verdict(&response) {
            Some(verdict) if verdict.verified => {
                tracing::info!(
                    component = "verification",
                    url = %candidate.source_url,
                    fuzzy_match = true,
                    "excerpt accepted by fuzzy fallback"
                );
                success(candidate)
            }
            Some(verdict) => failure(
                candidate,
                if verdict.reason.is_empty() {
                    "Excerpt not found in source content".to_string()
                } else {
                    verdict.reason
                },
            ),
            None => failure(candidate, "Excerpt not found in source content".to_string()),
        },
        Err(e) => {
            tracing::warn!(
                component = "verification",
                url = %candidate.source_url,
                error = %e,
                "fuzzy fallback failed"
            );
            failure(candidate, "Excerpt not found in source content".to_string())
        }
    }
}

fn success(candidate: &CandidateStatistic) -> VerificationResult {
    VerificationResult {
        statistic: Statistic::from_candidate(candidate, true),
        verified: true,
        reason: String::new(),
    }
}

fn failure(candidate: &CandidateStatistic, reason: String) -> VerificationResult {
    VerificationResult {
        statistic: Statistic::from_candidate(candidate, false),
        verified: false,
        reason,
    }
}

/// Slice `CONTEXT_RADIUS` characters either side of the excerpt match,
/// nudging the cut points back onto UTF-8 boundaries.
fn context_window(body: &str, match_index: usize, excerpt_len: usize) -> &str {
    let mut start = match_index.saturating_sub(CONTEXT_RADIUS);
    while start > 0 && !body.is_char_boundary(start) {
        start -= 1;
    }

    let mut end = (match_index + excerpt_len + CONTEXT_RADIUS).min(body.len());
    while end < body.len() && !body.is_char_boundary(end) {
        end += 1;
    }

    &body[start..end]
}

fn parse_fuzzy_verdict(response: &str) -> Option<FuzzyVerdict> {
    if let Ok(verdict) = serde_json::from_str(response) {
        return Some(verdict);
    }

    // LLMs habitually wrap JSON in fences or prose.
    let trimmed = response.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}
