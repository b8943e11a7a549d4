//! JSON-over-HTTP helper for worker-to-worker calls.
//!
//! Transport failures and non-2xx statuses are retryable; a 2xx response whose
//! body does not decode against the expected contract is budgeted the same way.

use crate::types::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

const BACKOFF_BASE_MS: u64 = 500;

/// POST `body` as JSON to `url` and decode the JSON response.
pub async fn post_json<Req, Resp>(client: &reqwest::Client, url: &str, body: &Req) -> Result<Resp>
where
    Req: Serialize,
    Resp: DeserializeOwned,
{
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| AppError::UpstreamUnavailable(format!("{}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(AppError::UpstreamUnavailable(format!(
            "{}: HTTP {} {}",
            url,
            status.as_u16(),
            detail
        )));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::UpstreamMalformed(format!("{}: {}", url, e)))
}

/// [`post_json`] with exponential backoff, bounded by `max_retries` additional
/// attempts and by `deadline`. Backoff that would overrun the deadline ends the
/// retry loop early with the last error.
pub async fn post_json_with_retry<Req, Resp>(
    client: &reqwest::Client,
    url: &str,
    body: &Req,
    max_retries: u32,
    deadline: Instant,
) -> Result<Resp>
where
    Req: Serialize,
    Resp: DeserializeOwned,
{
    let mut last_error = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let backoff = Duration::from_millis(BACKOFF_BASE_MS << (attempt - 1));
            if Instant::now() + backoff >= deadline {
                tracing::warn!(url, attempt, "deadline reached, abandoning retries");
                break;
            }
            tokio::time::sleep(backoff).await;
        }

        match post_json(client, url, body).await {
            Ok(resp) => return Ok(resp),
            Err(e) => {
                tracing::warn!(url, attempt, error = %e, "worker call failed");
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| AppError::UpstreamUnavailable(format!("{}: no attempts made", url))))
}
