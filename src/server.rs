//! HTTP serving surface: alerts dashboard data, the test trigger, the
//! on-demand analyzer, and screenshot artifacts.

use crate::core::{Alert, AlertStore};
use crate::monitor::Monitor;
use crate::report::{AnalyzeError, Analyzer};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

/// Shared state for all request handlers.
pub struct ServerState {
    pub store: Arc<dyn AlertStore>,
    pub monitor: Arc<Monitor>,
    pub analyzer: Arc<Analyzer>,
    pub screenshot_dir: PathBuf,
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/alerts", get(list_alerts))
        .route("/test-alert", get(trigger_test_alert))
        .route("/analyze", get(analyze))
        .route("/screenshots/{filename}", get(serve_screenshot))
        .with_state(state)
}

fn internal(e: impl Display) -> (StatusCode, String) {
    error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Every persisted alert, most recent first.
async fn list_alerts(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Vec<Alert>>, (StatusCode, String)> {
    state.store.list_all().await.map(Json).map_err(internal)
}

/// Appends the fixed test alert and returns a confirmation string.
async fn trigger_test_alert(
    State(state): State<Arc<ServerState>>,
) -> Result<String, (StatusCode, String)> {
    state.monitor.run_test_alert().await.map_err(internal)
}

#[derive(Debug, Deserialize)]
struct AnalyzeParams {
    url: String,
}

/// On-demand single-URL analysis.
async fn analyze(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<AnalyzeParams>,
) -> Result<String, (StatusCode, String)> {
    state.analyzer.analyze(&params.url).await.map_err(|e| match e {
        AnalyzeError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, format!("Error: {e}")),
    })
}

/// Serves a captured screenshot by filename.
async fn serve_screenshot(
    State(state): State<Arc<ServerState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // Filenames are domain-keyed; anything path-like is rejected outright.
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err((StatusCode::NOT_FOUND, "screenshot not found".to_string()));
    }
    let path = state.screenshot_dir.join(&filename);
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, "image/png")], bytes)),
        Err(_) => Err((StatusCode::NOT_FOUND, "screenshot not found".to_string())),
    }
}
