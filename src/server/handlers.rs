//! JSON endpoint handlers.
//!
//! Pipeline work is CPU bound, so every annotation runs on the blocking
//! thread pool against the shared pipeline.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};

use super::error::rejection_to_error;
use super::AppState;
use crate::gateway::{
    self, BasicAnalysisResponse, DependencyResponse, EntitiesResponse, GatewayError, PosResponse,
    SimilarityRequest, SimilarityResponse, TextRequest,
};
use crate::pipeline::{Pipeline, PipelineError};

type ApiResult<T> = Result<Json<T>, GatewayError>;

async fn run_blocking<T, F>(state: &AppState, job: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn Pipeline) -> Result<T, GatewayError> + Send + 'static,
{
    let pipeline = Arc::clone(&state.pipeline);
    let result = tokio::task::spawn_blocking(move || job(pipeline.as_ref()))
        .await
        .map_err(|e| {
            tracing::warn!("Annotation job aborted: {}", e);
            PipelineError::Aborted
        })?;
    result.map(Json)
}

/// Liveness check.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "model": state.pipeline.name(),
    }))
}

pub async fn ner(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> ApiResult<EntitiesResponse> {
    let Json(request) = payload.map_err(rejection_to_error)?;
    tracing::debug!("POST /ner ({} chars)", request.text.chars().count());
    run_blocking(&state, move |p| gateway::extract_entities(p, &request)).await
}

pub async fn pos(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> ApiResult<PosResponse> {
    let Json(request) = payload.map_err(rejection_to_error)?;
    tracing::debug!("POST /pos ({} chars)", request.text.chars().count());
    run_blocking(&state, move |p| gateway::tag_pos(p, &request)).await
}

pub async fn similarity(
    State(state): State<AppState>,
    payload: Result<Json<SimilarityRequest>, JsonRejection>,
) -> ApiResult<SimilarityResponse> {
    let Json(request) = payload.map_err(rejection_to_error)?;
    tracing::debug!("POST /similarity ({} texts)", request.texts.len());
    run_blocking(&state, move |p| gateway::compute_similarity(p, &request)).await
}

pub async fn basic_analysis(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> ApiResult<BasicAnalysisResponse> {
    let Json(request) = payload.map_err(rejection_to_error)?;
    tracing::debug!("POST /basic-analysis ({} chars)", request.text.chars().count());
    run_blocking(&state, move |p| gateway::basic_analysis(p, &request)).await
}

pub async fn dependency_parse(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> ApiResult<DependencyResponse> {
    let Json(request) = payload.map_err(rejection_to_error)?;
    tracing::debug!("POST /dependency-parse ({} chars)", request.text.chars().count());
    run_blocking(&state, move |p| gateway::dependency_parse(p, &request)).await
}
