use crate::orchestration::OrchestrationPipeline;
use crate::types::{OrchestrationRequest, OrchestrationResponse, Result};
use axum::{extract::State, Json};
use std::sync::Arc;

/// Find and verify statistics for a topic.
#[utoipa::path(
    post,
    path = "/orchestrate",
    request_body = OrchestrationRequest,
    responses(
        (status = 200, description = "Pipeline completed, possibly partial", body = OrchestrationResponse),
        (status = 400, description = "Invalid input"),
        (status = 500, description = "Upstream unavailable")
    ),
    tag = "orchestration"
)]
pub async fn orchestrate(
    State(pipeline): State<Arc<OrchestrationPipeline>>,
    Json(payload): Json<OrchestrationRequest>,
) -> Result<Json<OrchestrationResponse>> {
    Ok(Json(pipeline.orchestrate(&payload).await?))
}
