use crate::agents::ResearchAgent;
use crate::types::{ResearchRequest, ResearchResponse, Result};
use axum::{extract::State, Json};
use std::sync::Arc;

/// Discover candidate sources for a topic via the configured SERP provider.
#[utoipa::path(
    post,
    path = "/research",
    request_body = ResearchRequest,
    responses(
        (status = 200, description = "Search completed", body = ResearchResponse),
        (status = 500, description = "SERP provider unavailable")
    ),
    tag = "research"
)]
pub async fn research(
    State(agent): State<Arc<ResearchAgent>>,
    Json(payload): Json<ResearchRequest>,
) -> Result<Json<ResearchResponse>> {
    Ok(Json(agent.research(&payload).await?))
}
