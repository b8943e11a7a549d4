//! SerpAPI search client.

use crate::search::{domain_of, SearchProvider};
use crate::types::{AppError, Result, SearchResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const API_URL: &str = "https://serpapi.com/search.json";
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct SerpApiClient {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
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

impl SerpApiClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchResult>> {
        let num = num_results.to_string();
        let response = self
            .client
            .get(API_URL)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("num", num.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("serpapi: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UpstreamUnavailable(format!(
                "serpapi: HTTP {}",
                status.as_u16()
            )));
        }

        let parsed: SerpApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamMalformed(format!("serpapi: {}", e)))?;

        Ok(parsed
            .organic_results
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
        "serpapi"
    }
}
