//! Mock implementations shared across integration tests.
//!
//! Provides a canned LLM client and search provider so worker logic can be
//! exercised without any external API, plus a helper that serves an axum
//! router on an ephemeral local port.

use async_trait::async_trait;
use axum::Router;
use veristat::llm::LLMClient;
use veristat::search::SearchProvider;
use veristat::types::{AppError, Result, SearchResult};

/// Mock LLM client that always returns the same response.
#[derive(Clone)]
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
}

impl MockLLMClient {
    /// Create a mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            response: String::new(),
            should_fail: true,
        }
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        if self.should_fail {
            return Err(AppError::Llm("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    async fn generate_with_system(&self, _system: &str, _prompt: &str) -> Result<String> {
        if self.should_fail {
            return Err(AppError::Llm("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Mock search provider returning a fixed result list.
pub struct MockSearchProvider {
    results: Vec<SearchResult>,
}

impl MockSearchProvider {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self { results }
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, _query: &str, _num_results: usize) -> Result<Vec<SearchResult>> {
        Ok(self.results.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

pub fn search_result(url: &str, domain: &str) -> SearchResult {
    SearchResult {
        url: url.to_string(),
        title: format!("Title for {}", domain),
        snippet: String::new(),
        domain: domain.to_string(),
    }
}

/// Serve a router on 127.0.0.1 with an ephemeral port; returns the base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("listener has no local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server failed");
    });

    format!("http://{}", addr)
}
