//! Timeline API routes - frames, event listing, bounds and time literal parsing

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{branch_error, ApiError};
use crate::domain::services::time_codec::{self, TimeRange};
use crate::domain::services::{Frame, TimelineEntry, ZoomLevel};
use crate::infrastructure::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FrameQuery {
    /// Time literal; missing or unreadable literals fall back to the default year
    #[serde(default)]
    pub t: Option<String>,
    #[serde(default)]
    pub zoom: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ParseQuery {
    pub literal: String,
}

#[derive(Debug, Serialize)]
pub struct ParsedTime {
    pub literal: String,
    pub years: f64,
    pub short: String,
    pub long: String,
}

#[derive(Debug, Serialize)]
pub struct TimelineBounds {
    #[serde(flatten)]
    pub range: TimeRange,
    pub min_label: String,
    pub max_label: String,
}

/// Project the composed model at the requested instant
pub async fn get_frame(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FrameQuery>,
) -> Result<Json<Frame>, ApiError> {
    let zoom = query
        .zoom
        .as_deref()
        .unwrap_or_default()
        .parse::<ZoomLevel>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let world = state.world.read().await;
    let range = world.timeline_bounds().map_err(branch_error)?;
    let t = time_codec::seek(query.t.as_deref().unwrap_or_default(), &range);

    let frame = world.project(t, zoom).map_err(branch_error)?;
    Ok(Json(frame))
}

/// Events of the composed model, earliest first
pub async fn get_timeline(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TimelineEntry>>, ApiError> {
    let entries = state.world.read().await.timeline().map_err(branch_error)?;
    Ok(Json(entries))
}

/// Scrubber bounds of the composed model
pub async fn get_bounds(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimelineBounds>, ApiError> {
    let range = state.world.read().await.timeline_bounds().map_err(branch_error)?;
    Ok(Json(TimelineBounds {
        range,
        min_label: time_codec::format_short(range.min),
        max_label: time_codec::format_short(range.max),
    }))
}

/// Parse a literal and echo its canonical labels
pub async fn parse_time(Query(query): Query<ParseQuery>) -> Result<Json<ParsedTime>, ApiError> {
    let years = time_codec::try_parse(&query.literal)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    Ok(Json(ParsedTime {
        literal: query.literal,
        years,
        short: time_codec::format_short(years),
        long: time_codec::format_long(years),
    }))
}
