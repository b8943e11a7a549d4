//! Serper.dev search client.

use crate::search::{domain_of, SearchProvider};
use crate::types::{AppError, Result, SearchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_URL: &str = "https://google.serper.dev/search";
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct SerperClient {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
}

#[derive(Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl SerperClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl SearchProvider for SerperClient {
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .post(API_URL)
            .header("X-API-KEY", &self.api_key)
            .json(&SerperRequest {
                q: query,
                num: num_results,
            })
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("serper: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UpstreamUnavailable(format!(
                "serper: HTTP {}",
                status.as_u16()
            )));
        }

        let parsed: SerperResponse = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamMalformed(format!("serper: {}", e)))?;

        Ok(parsed
            .organic
            .into_iter()
            .filter(|hit| !hit.link.is_empty())
            .map(|hit| SearchResult {
                domain: domain_of(&hit.link),
                url: hit.link,
                title: hit.title,
                snippet: hit.snippet,
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "serper"
    }
}
