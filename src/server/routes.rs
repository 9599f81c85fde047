//! Router configuration for the web server.

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::AppState;

/// Create the main router with all routes and permissive CORS.
pub fn create_router(state: AppState) -> Router {
    create_router_with_cors(state, CorsLayer::permissive())
}

pub fn create_router_with_cors(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Annotation endpoints
        .route("/ner", post(handlers::ner))
        .route("/pos", post(handlers::pos))
        .route("/similarity", post(handlers::similarity))
        .route("/basic-analysis", post(handlers::basic_analysis))
        .route("/dependency-parse", post(handlers::dependency_parse))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS layer for the configured origins; `*` (or no origins) allows any.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return Ok(CorsLayer::permissive());
    }

    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    tracing::info!("CORS: allowing origins {:?}", origins);

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}
