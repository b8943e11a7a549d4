//! Page fetching shared by the synthesis and verification agents.

use crate::types::{AppError, Result};
use futures::StreamExt;
use std::time::Duration;

const USER_AGENT: &str = "StatsAgentTeam/1.0";
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Fetches page bodies with a per-request deadline and a hard size cap.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| AppError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// GET the URL and return its body as text, capped at 10 MiB.
    /// Non-200 responses are errors; callers decide whether they are fatal.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("failed to fetch URL: {}", e)))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(AppError::Fetch(format!("HTTP {}", status.as_u16())));
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| AppError::Fetch(format!("failed to read body: {}", e)))?;
            let remaining = MAX_BODY_BYTES - body.len();
            if chunk.len() >= remaining {
                body.extend_from_slice(&chunk[..remaining]);
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Truncate to at most `max_chars` bytes without splitting a UTF-8 sequence.
pub fn truncate_content(content: &str, max_chars: usize) -> &str {
    if content.len() <= max_chars {
        return content;
    }

    let mut end = max_chars;
    while end > 0 && !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}
