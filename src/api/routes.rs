use crate::agents::{ResearchAgent, SynthesisAgent, VerificationAgent};
use crate::api::handlers;
use crate::orchestration::OrchestrationPipeline;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Every role answers its health probe the same way.
async fn health_check() -> &'static str {
    "OK"
}

fn with_middleware(router: Router) -> Router {
    router
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

pub fn orchestrator_router(pipeline: Arc<OrchestrationPipeline>) -> Router {
    with_middleware(
        Router::new()
            .route("/orchestrate", post(handlers::orchestrate::orchestrate))
            .route("/health", get(health_check))
            .with_state(pipeline),
    )
}

pub fn research_router(agent: Arc<ResearchAgent>) -> Router {
    with_middleware(
        Router::new()
            .route("/research", post(handlers::research::research))
            .route("/health", get(health_check))
            .with_state(agent),
    )
}

pub fn synthesis_router(agent: Arc<SynthesisAgent>) -> Router {
    with_middleware(
        Router::new()
            .route("/synthesize", post(handlers::synthesize::synthesize))
            .route("/health", get(health_check))
            .with_state(agent),
    )
}

pub fn verification_router(agent: Arc<VerificationAgent>) -> Router {
    with_middleware(
        Router::new()
            .route("/verify", post(handlers::verify::verify))
            .route("/health", get(health_check))
            .with_state(agent),
    )
}
