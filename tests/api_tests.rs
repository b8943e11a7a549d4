//! HTTP-surface tests for the per-role routers.

mod common;

use axum_test::TestServer;
use common::mocks::{search_result, spawn_server, MockLLMClient, MockSearchProvider};
use serde_json::json;
use std::sync::Arc;
use veristat::agents::{ResearchAgent, SynthesisAgent, VerificationAgent};
use veristat::api::routes;
use veristat::orchestration::OrchestrationPipeline;
use veristat::utils::config::{
    AgentUrls, Config, HttpConfig, LlmConfig, SearchConfig, ServerConfig,
};
use veristat::utils::fetch::PageFetcher;

fn unroutable_config() -> Arc<Config> {
    Arc::new(Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            orchestrator_port: 0,
            research_port: 0,
            synthesis_port: 0,
            verification_port: 0,
        },
        llm: LlmConfig {
            provider: "gemini".to_string(),
            api_key: String::new(),
            model: String::new(),
            ollama_url: String::new(),
        },
        search: SearchConfig {
            provider: "serper".to_string(),
            serper_api_key: String::new(),
            serpapi_api_key: String::new(),
        },
        agents: AgentUrls {
            research_url: "http://127.0.0.1:1".to_string(),
            synthesis_url: "http://127.0.0.1:1".to_string(),
            verification_url: "http://127.0.0.1:1".to_string(),
        },
        http: HttpConfig {
            timeout_seconds: 5,
            worker_timeout_seconds: 1,
            fetch_timeout_seconds: 1,
            fuzzy_verification: false,
        },
        a2a_enabled: false,
    })
}

fn orchestrator_server() -> TestServer {
    let pipeline = Arc::new(OrchestrationPipeline::new(unroutable_config()).unwrap());
    TestServer::new(routes::orchestrator_router(pipeline)).unwrap()
}

#[tokio::test]
async fn test_health_endpoints() {
    let orchestrator = orchestrator_server();
    let response = orchestrator.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");

    let research = TestServer::new(routes::research_router(Arc::new(ResearchAgent::new(
        Box::new(MockSearchProvider::new(vec![])),
    ))))
    .unwrap();
    research.get("/health").await.assert_text("OK");

    let verification = TestServer::new(routes::verification_router(Arc::new(
        VerificationAgent::new(PageFetcher::new(1).unwrap(), None),
    )))
    .unwrap();
    verification.get("/health").await.assert_text("OK");

    let synthesis = TestServer::new(routes::synthesis_router(Arc::new(SynthesisAgent::new(
        Arc::new(MockLLMClient::new("[]")),
        PageFetcher::new(1).unwrap(),
    ))))
    .unwrap();
    synthesis.get("/health").await.assert_text("OK");
}

#[tokio::test]
async fn test_orchestrate_rejects_empty_topic_with_400() {
    let server = orchestrator_server();

    let response = server
        .post("/orchestrate")
        .json(&json!({"topic": "", "min_verified_stats": 5}))
        .await;

    response.assert_status_bad_request();
    assert!(response.text().contains("Invalid input"));
}

#[tokio::test]
async fn test_orchestrate_rejects_inverted_bounds_with_400() {
    let server = orchestrator_server();

    let response = server
        .post("/orchestrate")
        .json(&json!({"topic": "solar", "min_verified_stats": 20, "max_candidates": 5}))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_orchestrate_zero_target_returns_ok() {
    let server = orchestrator_server();

    let response = server
        .post("/orchestrate")
        .json(&json!({"topic": "solar", "min_verified_stats": 0}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["verified_count"], 0);
    assert_eq!(body["partial"], false);
    assert!(body["statistics"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_research_endpoint_returns_results() {
    let agent = Arc::new(ResearchAgent::new(Box::new(MockSearchProvider::new(vec![
        search_result("https://www.iea.org/reports/renewables-2023", "iea.org"),
        search_result("https://www.example.org/post", "example.org"),
    ]))));
    let server = TestServer::new(routes::research_router(agent)).unwrap();

    let response = server
        .post("/research")
        .json(&json!({"topic": "renewable energy", "max_statistics": 10}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["topic"], "renewable energy");
    assert_eq!(body["search_results"].as_array().unwrap().len(), 2);
    assert_eq!(body["search_results"][0]["domain"], "iea.org");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_verify_endpoint_round_trip() {
    let page = axum::Router::new().route(
        "/page",
        axum::routing::get(|| async { "Exactly 12 measurements were taken in total." }),
    );
    let base = spawn_server(page).await;

    let agent = Arc::new(VerificationAgent::new(PageFetcher::new(5).unwrap(), None));
    let server = TestServer::new(routes::verification_router(agent)).unwrap();

    let response = server
        .post("/verify")
        .json(&json!({
            "candidates": [{
                "name": "Measurements",
                "value": 12,
                "unit": "measurements",
                "source": "localhost",
                "source_url": format!("{}/page", base),
                "excerpt": "Exactly 12 measurements were taken"
            }],
            "ignored_future_field": true
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["verified_count"], 1);
    assert_eq!(body["failed_count"], 0);
    assert_eq!(body["results"][0]["verified"], true);
    assert_eq!(body["results"][0]["statistic"]["value"], 12.0);
}

#[tokio::test]
async fn test_synthesize_endpoint_round_trip() {
    let page = axum::Router::new().route(
        "/page",
        axum::routing::get(|| async { "Adoption grew to 63 percent this year." }),
    );
    let base = spawn_server(page).await;

    let agent = Arc::new(SynthesisAgent::new(
        Arc::new(MockLLMClient::new(
            r#"[{"name": "Adoption", "value": 63, "unit": "percent",
                 "excerpt": "Adoption grew to 63 percent this year"}]"#,
        )),
        PageFetcher::new(5).unwrap(),
    ));
    let server = TestServer::new(routes::synthesis_router(agent)).unwrap();

    let response = server
        .post("/synthesize")
        .json(&json!({
            "topic": "adoption",
            "search_results": [{
                "url": format!("{}/page", base),
                "title": "Adoption report",
                "snippet": "",
                "domain": "example.org"
            }]
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["candidates"].as_array().unwrap().len(), 1);
    assert_eq!(body["candidates"][0]["source"], "example.org");
}
