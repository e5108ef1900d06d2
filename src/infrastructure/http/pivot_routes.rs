//! Pivot API routes

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::{branch_error, ApiError};
use crate::domain::entities::PivotSummary;
use crate::domain::services::PivotSelection;
use crate::domain::value_objects::PivotId;
use crate::infrastructure::state::AppState;

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub pivot_id: PivotId,
    pub active: bool,
    pub selection: PivotSelection,
}

/// List the pivot catalog
pub async fn list_pivots(State(state): State<Arc<AppState>>) -> Json<Vec<PivotSummary>> {
    Json(state.world.read().await.registry().pivots())
}

pub async fn get_selection(State(state): State<Arc<AppState>>) -> Json<PivotSelection> {
    Json(state.world.read().await.selection().clone())
}

/// Switch a pivot on or off
pub async fn toggle_pivot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let pivot_id = PivotId::new(id);
    let mut world = state.world.write().await;
    let active = world.toggle_pivot(pivot_id.clone()).map_err(branch_error)?;

    Ok(Json(ToggleResponse {
        pivot_id,
        active,
        selection: world.selection().clone(),
    }))
}
