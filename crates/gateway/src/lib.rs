//! HTTP API gateway for PaperForge.
//!
//! Exposes the paper generation endpoint, the syllabus listing, and a health
//! check. Clients (LLM provider, vector index) and the syllabus registry are
//! built once at startup and shared by every request.
//!
//! Built on Axum for high performance async HTTP.

pub mod api_v1;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    http::{Method, header},
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use paperforge_config::AppConfig;
use paperforge_engine::{GeneratorSettings, PaperGenerator, SyllabusRegistry};
use paperforge_index::PineconeIndex;

/// Request bodies above this size are rejected.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub generator: Arc<PaperGenerator>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - Request body size limit (1 MB)
/// - CORS for browser clients
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/paper/generate", post(api_v1::generate_handler))
        .with_state(state.clone())
        .nest("/v1", api_v1::v1_router(state))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Build the generator from configuration: provider, index and registry.
pub async fn build_generator(config: &AppConfig) -> Result<PaperGenerator, Box<dyn std::error::Error>> {
    let provider = paperforge_providers::build_from_config(config)?;
    let credentials = config.require_pinecone()?;
    let index = PineconeIndex::connect(
        credentials.api_key,
        &credentials.index_name,
        credentials.host.as_deref(),
    )
    .await?;
    let registry = Arc::new(SyllabusRegistry::class10_science()?);

    Ok(PaperGenerator::new(
        registry,
        provider,
        Arc::new(index),
        GeneratorSettings::from_config(config),
    ))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let generator = build_generator(&config).await?;
    let state = Arc::new(GatewayState {
        generator: Arc::new(generator),
    });
    let app = build_router(state);

    info!(addr = %addr, model = %config.openai.model, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
