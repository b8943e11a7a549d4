use crate::agents::SynthesisAgent;
use crate::types::{Result, SynthesisRequest, SynthesisResponse};
use axum::{extract::State, Json};
use std::sync::Arc;

/// Extract candidate statistics from the given sources with the LLM.
#[utoipa::path(
    post,
    path = "/synthesize",
    request_body = SynthesisRequest,
    responses(
        (status = 200, description = "Extraction completed", body = SynthesisResponse),
        (status = 500, description = "LLM provider unavailable")
    ),
    tag = "synthesis"
)]
pub async fn synthesize(
    State(agent): State<Arc<SynthesisAgent>>,
    Json(payload): Json<SynthesisRequest>,
) -> Result<Json<SynthesisResponse>> {
    let response = agent.synthesize(&payload).await?;
    Ok(Json(response))
}
