//! World model API routes - ingestion, queries, inspection and export

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{append_error, branch_error, extraction_error, query_error, ApiError};
use crate::application::ports::outbound::LlmPort;
use crate::application::services::IngestionRecord;
use crate::domain::aggregates::{ModelNotes, ModelStats, WorldModel};
use crate::infrastructure::export::ModelSnapshot;
use crate::infrastructure::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub raw_text: String,
    /// Free-form label of where the text came from
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub ingestion: IngestionRecord,
    /// Notes attached to the extracted fragment
    pub notes: ModelNotes,
    /// Base model counts after the append
    pub stats: ModelStats,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
}

/// Get the base model
pub async fn get_base_model(State(state): State<Arc<AppState>>) -> Json<WorldModel> {
    let base = state.world.read().await.base();
    Json(WorldModel::clone(&base))
}

/// Get the base model composed with the active pivots
pub async fn get_composed_model(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WorldModel>, ApiError> {
    let composed = state.world.read().await.composed_model().map_err(branch_error)?;
    Ok(Json(WorldModel::clone(&composed)))
}

/// Counts of the composed model
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<ModelStats>, ApiError> {
    let composed = state.world.read().await.composed_model().map_err(branch_error)?;
    Ok(Json(composed.stats()))
}

pub async fn get_history(State(state): State<Arc<AppState>>) -> Json<Vec<IngestionRecord>> {
    Json(state.world.read().await.history().to_vec())
}

/// Export the base model as a snapshot
pub async fn export_model(State(state): State<Arc<AppState>>) -> Json<ModelSnapshot> {
    let world = state.world.read().await;
    Json(ModelSnapshot::capture(&world))
}

/// Extract a fragment from raw text and append it to the base model
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IngestRequest>,
) -> Result<(StatusCode, Json<IngestResponse>), ApiError> {
    // Extraction can take a while; the model lock is only taken to append
    let fragment = state
        .extraction_service
        .extract(&req.raw_text)
        .await
        .map_err(extraction_error)?;

    let mut world = state.world.write().await;
    let ingestion = world.ingest(&fragment, req.source).map_err(append_error)?;
    let stats = world.base().stats();

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            ingestion,
            notes: fragment.notes,
            stats,
        }),
    ))
}

/// Answer a question against the composed model
pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let composed = state.world.read().await.composed_model().map_err(branch_error)?;

    let answer = state
        .query_service
        .query(&req.question, &composed)
        .await
        .map_err(query_error)?;

    Ok(Json(QueryResponse { answer }))
}

/// Reachability of the LLM backend
pub async fn llm_health(State(state): State<Arc<AppState>>) -> Result<&'static str, ApiError> {
    state
        .llm_client
        .health_check()
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?;
    Ok("OK")
}
