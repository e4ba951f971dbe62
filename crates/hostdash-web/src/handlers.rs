//! HTTP request handlers: API endpoints and frontend serving.

use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Json, Response};
use rust_embed::Embed;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error};

use hostdash_core::Snapshot;
use hostdash_core::fmt::iso_timestamp;
use hostdash_core::history::MetricPoint;

use crate::state::AppState;

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

// ============================================================
// Embedded frontend assets
// ============================================================

#[derive(Embed)]
#[folder = "frontend"]
struct FrontendAssets;

// ============================================================
// Errors
// ============================================================

/// JSON error body shared by every failing API response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub(crate) struct ErrorBody {
    error: String,
    timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ApiError {
    #[error("Rota não encontrada")]
    NotFound,
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(message) => {
                error!(error = %message, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorBody {
            error: self.to_string(),
            timestamp: iso_timestamp(),
        };
        (status, [(header::CACHE_CONTROL, NO_CACHE)], Json(body)).into_response()
    }
}

/// Runs blocking collection work off the async workers.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))
}

fn no_cache_json<T: Serialize>(body: T) -> Response {
    ([(header::CACHE_CONTROL, NO_CACHE)], Json(body)).into_response()
}

// ============================================================
// Health
// ============================================================

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    )
)]
pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

// ============================================================
// Status
// ============================================================

#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Fresh snapshot of every domain, also appended to history"),
        (status = 500, description = "Collection task failed", body = ErrorBody)
    )
)]
pub(crate) async fn handle_status(State(orchestrator): AppState) -> Result<Response, ApiError> {
    let snapshot: Snapshot = blocking(move || orchestrator.poll_and_record()).await?;
    Ok(no_cache_json(snapshot))
}

// ============================================================
// History
// ============================================================

#[utoipa::path(
    get,
    path = "/api/history",
    responses(
        (status = 200, description = "Retained snapshots, oldest first")
    )
)]
pub(crate) async fn handle_history(State(orchestrator): AppState) -> Response {
    no_cache_json(orchestrator.history().get_history())
}

#[utoipa::path(
    get,
    path = "/api/metric/{path}",
    params(
        ("path" = String, Path, description = "Dotted metric path, e.g. `hardware.cpu.usage`")
    ),
    responses(
        (status = 200, description = "Values of the metric across history", body = [MetricPoint])
    )
)]
pub(crate) async fn handle_metric(
    State(orchestrator): AppState,
    Path(path): Path<String>,
) -> Response {
    let points = orchestrator.history().get_metric_history(&path);
    debug!(path, points = points.len(), "metric history");
    no_cache_json(points)
}

// ============================================================
// Single domain
// ============================================================

#[utoipa::path(
    get,
    path = "/api/{domain}",
    params(
        ("domain" = String, Path, description = "One of system, hardware, network, storage, process, android")
    ),
    responses(
        (status = 200, description = "Latest value of one domain with a timestamp"),
        (status = 404, description = "Unknown domain", body = ErrorBody)
    )
)]
pub(crate) async fn handle_domain(
    State(orchestrator): AppState,
    Path(domain): Path<String>,
) -> Result<Response, ApiError> {
    let (domain, value) = blocking(move || {
        let value = orchestrator.collect_domain(&domain);
        (domain, value)
    })
    .await?;
    let value = value.ok_or(ApiError::NotFound)?;

    let mut body = Map::new();
    body.insert(domain, value);
    body.insert("timestamp".to_string(), Value::String(iso_timestamp()));
    Ok(no_cache_json(Value::Object(body)))
}

// ============================================================
// Frontend static files
// ============================================================

pub(crate) async fn serve_frontend(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    // Unmatched API paths answer in JSON, never with the page.
    if path == "api" || path.starts_with("api/") {
        return ApiError::NotFound.into_response();
    }

    if let Some(file) = FrontendAssets::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        return ([(header::CONTENT_TYPE, mime.to_string())], file.data).into_response();
    }

    if path.starts_with("static/") {
        return (StatusCode::NOT_FOUND, "Arquivo não encontrado").into_response();
    }

    match FrontendAssets::get("index.html") {
        Some(index) => (
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            index.data,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}
