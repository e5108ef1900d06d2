//! HTTP REST API routes

mod model_routes;
mod pivot_routes;
mod timeline_routes;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::application::services::{ExtractionError, QueryError};
use crate::domain::aggregates::AppendError;
use crate::domain::services::BranchError;
use crate::infrastructure::state::AppState;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Model routes
        .route("/api/model", get(model_routes::get_base_model))
        .route("/api/model/composed", get(model_routes::get_composed_model))
        .route("/api/model/stats", get(model_routes::get_stats))
        .route("/api/model/history", get(model_routes::get_history))
        .route("/api/model/export", get(model_routes::export_model))
        .route("/api/ingest", post(model_routes::ingest))
        .route("/api/query", post(model_routes::query))
        .route("/api/llm/health", get(model_routes::llm_health))
        // Timeline routes
        .route("/api/frame", get(timeline_routes::get_frame))
        .route("/api/timeline", get(timeline_routes::get_timeline))
        .route("/api/timeline/bounds", get(timeline_routes::get_bounds))
        .route("/api/time/parse", get(timeline_routes::parse_time))
        // Pivot routes
        .route("/api/pivots", get(pivot_routes::list_pivots))
        .route("/api/pivots/selection", get(pivot_routes::get_selection))
        .route("/api/pivots/{id}/toggle", post(pivot_routes::toggle_pivot))
}

type ApiError = (StatusCode, String);

fn append_error(e: AppendError) -> ApiError {
    let status = match e {
        AppendError::DuplicateId { .. } => StatusCode::CONFLICT,
        AppendError::InvalidRecord { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, e.to_string())
}

fn branch_error(e: BranchError) -> ApiError {
    let status = match e {
        BranchError::UnknownPivot(_) => StatusCode::NOT_FOUND,
        BranchError::DuplicatePivot(_) | BranchError::DuplicateRecord { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.to_string())
}

fn extraction_error(e: ExtractionError) -> ApiError {
    let status = match e {
        ExtractionError::InsufficientContent { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ExtractionError::Llm(_) | ExtractionError::Schema(_) => StatusCode::BAD_GATEWAY,
    };
    (status, e.to_string())
}

fn query_error(e: QueryError) -> ApiError {
    let status = match e {
        QueryError::EmptyQuestion => StatusCode::UNPROCESSABLE_ENTITY,
        QueryError::Context(_) => StatusCode::INTERNAL_SERVER_ERROR,
        QueryError::Llm(_) => StatusCode::BAD_GATEWAY,
    };
    (status, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::domain::aggregates::WorldModel;
    use crate::domain::entities::Entity;
    use crate::domain::value_objects::Geometry;
    use crate::infrastructure::config::AppConfig;
    use crate::infrastructure::pivot_catalog;

    fn test_config() -> AppConfig {
        AppConfig {
            ollama_base_url: "http://127.0.0.1:9/v1".to_string(),
            ollama_model: "test".to_string(),
            ollama_query_model: "test".to_string(),
            server_port: 0,
            extraction_min_chars: 20,
            pivot_catalog_path: None,
        }
    }

    async fn app() -> (Router, Arc<AppState>) {
        let registry = pivot_catalog::load_registry(None).unwrap();
        let state = Arc::new(AppState::with_registry(test_config(), registry));

        let mut fragment = WorldModel::new();
        fragment.entities.push(
            Entity::new("pangaea", "Landmass", "Pangaea")
                .with_valid_time("-335 Ma")
                .with_location(Geometry::polygon([(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)])),
        );
        state.world.write().await.ingest(&fragment, None).unwrap();

        (create_routes().with_state(Arc::clone(&state)), state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    #[tokio::test]
    async fn test_toggle_pivot_changes_composed_model() {
        let (app, _) = app().await;

        let (status, body) = send(&app, "POST", "/api/pivots/P_SING/toggle", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["active"], true);

        let (_, composed) = send(&app, "GET", "/api/model/composed", None).await;
        assert_eq!(composed["entities"].as_array().map(Vec::len), Some(2));

        let (_, selection) = send(&app, "GET", "/api/pivots/selection", None).await;
        assert_eq!(selection, serde_json::json!(["P_SING"]));

        send(&app, "POST", "/api/pivots/P_SING/toggle", None).await;
        let (_, base) = send(&app, "GET", "/api/model", None).await;
        let (_, composed) = send(&app, "GET", "/api/model/composed", None).await;
        assert_eq!(base, composed);
    }

    #[tokio::test]
    async fn test_unknown_pivot_is_not_found() {
        let (app, _) = app().await;
        let (status, _) = send(&app, "POST", "/api/pivots/P_NONE/toggle", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_frame_endpoint() {
        let (app, _) = app().await;

        let (status, frame) = send(&app, "GET", "/api/frame?t=-300Ma&zoom=bird", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(frame["zoom"], "bird");
        assert_eq!(frame["zoom_label"], "Bird's Eye View");
        assert_eq!(frame["entities"][0]["entity_id"], "pangaea");
        assert_eq!(frame["style"]["show_labels"], true);

        let (_, early) = send(&app, "GET", "/api/frame?t=-400Ma", None).await;
        assert_eq!(early["entities"].as_array().map(Vec::len), Some(0));

        let (status, _) = send(&app, "GET", "/api/frame?zoom=orbit", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_timeline_endpoint_lists_overlay_events_in_order() {
        let (app, _) = app().await;
        let (status, body) = send(&app, "GET", "/api/timeline", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(0));

        send(&app, "POST", "/api/pivots/P_SING/toggle", None).await;
        send(&app, "POST", "/api/pivots/P_MARS/toggle", None).await;
        let (_, body) = send(&app, "GET", "/api/timeline", None).await;
        assert_eq!(body[0]["event_id"], "EV-ARES-LANDING");
        assert_eq!(body[1]["event_id"], "EV-SINGULARITY");
        assert_eq!(body[1]["label"], "2045 AD");
        assert_eq!(body[1]["participants"][0]["entity_id"], "ASI-1");
        assert_eq!(body[1]["branched"], true);
    }

    #[tokio::test]
    async fn test_time_parse_endpoint() {
        let (app, _) = app().await;
        let (status, body) = send(&app, "GET", "/api/time/parse?literal=-4.54Ga", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["short"], "4.54 Ga");
        assert_eq!(body["long"], "4.54 Billion Years Ago");

        let (status, _) = send(&app, "GET", "/api/time/parse?literal=whenever", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_short_ingest_rejected_without_llm_call() {
        let (app, state) = app().await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/ingest",
            Some(serde_json::json!({ "raw_text": "tiny" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(state.world.read().await.revision(), 1);
    }

    #[tokio::test]
    async fn test_empty_question_rejected() {
        let (app, _) = app().await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/query",
            Some(serde_json::json!({ "question": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_stats_and_export() {
        let (app, _) = app().await;
        let (_, stats) = send(&app, "GET", "/api/model/stats", None).await;
        assert_eq!(stats["entities"], 1);

        let (_, history) = send(&app, "GET", "/api/model/history", None).await;
        assert_eq!(history[0]["revision"], 1);

        let (status, snapshot) = send(&app, "GET", "/api/model/export", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["revision"], 1);
        assert_eq!(snapshot["model"]["entities"][0]["entity_id"], "pangaea");
    }

    #[test]
    fn test_error_status_mapping() {
        let duplicate = AppendError::DuplicateId {
            kind: crate::domain::aggregates::RecordKind::Entity,
            id: "x".to_string(),
        };
        assert_eq!(append_error(duplicate).0, StatusCode::CONFLICT);
        assert_eq!(
            extraction_error(ExtractionError::Llm("down".to_string())).0,
            StatusCode::BAD_GATEWAY
        );
    }
}
