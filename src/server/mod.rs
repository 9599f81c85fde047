//! HTTP server exposing the annotation gateway.
//!
//! Routes:
//! - `POST /ner`, `/pos`, `/similarity`, `/basic-analysis`, `/dependency-parse`
//! - `GET /health`

mod error;
mod handlers;
mod routes;

pub use routes::{cors_layer, create_router, create_router_with_cors};

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::pipeline::{self, Pipeline};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup and only ever read.
    pub pipeline: Arc<dyn Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<dyn Pipeline>) -> Self {
        Self { pipeline }
    }

    /// Load the configured pipeline.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let pipeline = pipeline::load(&settings.model, &settings.pipeline_config())?;
        Ok(Self::new(Arc::from(pipeline)))
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::from_settings(settings)?;
    let app = create_router_with_cors(state, cors_layer(&settings.cors_origins)?);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
