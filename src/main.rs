use clap::{Parser, ValueEnum};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use veristat::{
    agents::{ResearchAgent, SynthesisAgent, VerificationAgent},
    api::routes,
    llm::Provider,
    orchestration::OrchestrationPipeline,
    search,
    types,
    utils::{config::Config, fetch::PageFetcher},
};

#[derive(Parser)]
#[command(
    name = "veristat",
    about = "Multi-agent service that finds and verifies numerical statistics"
)]
struct Cli {
    /// Which agent role this process serves.
    #[arg(value_enum)]
    role: Role,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Role {
    Orchestrator,
    Research,
    Synthesis,
    Verification,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        veristat::api::handlers::orchestrate::orchestrate,
        veristat::api::handlers::research::research,
        veristat::api::handlers::synthesize::synthesize,
        veristat::api::handlers::verify::verify,
    ),
    components(schemas(
        types::OrchestrationRequest,
        types::OrchestrationResponse,
        types::ResearchRequest,
        types::ResearchResponse,
        types::SynthesisRequest,
        types::SynthesisResponse,
        types::VerificationRequest,
        types::VerificationResponse,
        types::SearchResult,
        types::CandidateStatistic,
        types::Statistic,
        types::VerificationResult,
    )),
    tags(
        (name = "orchestration", description = "Pipeline entry point"),
        (name = "research", description = "Source discovery"),
        (name = "synthesis", description = "Statistic extraction"),
        (name = "verification", description = "Source-of-truth checks"),
    ),
    info(
        title = "veristat",
        description = "Finds verifiable numerical statistics and proves them against their sources"
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let cfg = Arc::new(Config::from_env()?);

    if cfg.a2a_enabled {
        // The optional A2A RPC surface never changes HTTP behaviour.
        tracing::info!("A2A flag set; serving HTTP endpoints unchanged");
    }

    let (router, port) = match cli.role {
        Role::Orchestrator => {
            let pipeline = Arc::new(OrchestrationPipeline::new(cfg.clone())?);
            let router = routes::orchestrator_router(pipeline).route(
                "/api-docs/openapi.json",
                axum::routing::get(|| async { axum::Json(ApiDoc::openapi()) }),
            );
            (router, cfg.server.orchestrator_port)
        }
        Role::Research => {
            let provider = search::provider_from_config(&cfg)?;
            tracing::info!(provider = provider.name(), "search provider initialized");
            let agent = Arc::new(ResearchAgent::new(provider));
            (routes::research_router(agent), cfg.server.research_port)
        }
        Role::Synthesis => {
            let provider = Provider::from_config(&cfg)?;
            tracing::info!(provider = provider.name(), "LLM provider initialized");
            let llm = provider.create_client()?;
            let fetcher = PageFetcher::new(cfg.http.fetch_timeout_seconds)?;
            let agent = Arc::new(SynthesisAgent::new(llm, fetcher));
            (routes::synthesis_router(agent), cfg.server.synthesis_port)
        }
        Role::Verification => {
            let llm = if cfg.http.fuzzy_verification {
                let provider = Provider::from_config(&cfg)?;
                tracing::info!(provider = provider.name(), "fuzzy fallback enabled");
                Some(provider.create_client()?)
            } else {
                None
            };
            let fetcher = PageFetcher::new(cfg.http.fetch_timeout_seconds)?;
            let agent = Arc::new(VerificationAgent::new(fetcher, llm));
            (
                routes::verification_router(agent),
                cfg.server.verification_port,
            )
        }
    };

    let addr = format!("{}:{}", cfg.server.host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(role = ?cli.role, "server running on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutting down gracefully...");
}
