use crate::agents::VerificationAgent;
use crate::types::{Result, VerificationRequest, VerificationResponse};
use axum::{extract::State, Json};
use std::sync::Arc;

/// Verify candidates against the bytes of their cited sources.
#[utoipa::path(
    post,
    path = "/verify",
    request_body = VerificationRequest,
    responses(
        (status = 200, description = "Verification completed", body = VerificationResponse)
    ),
    tag = "verification"
)]
pub async fn verify(
    State(agent): State<Arc<VerificationAgent>>,
    Json(payload): Json<VerificationRequest>,
) -> Result<Json<VerificationResponse>> {
    let response = agent.verify(&payload).await?;
    Ok(Json(response))
}
