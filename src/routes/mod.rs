//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The editor runs on its own dev-server port and talks to this router over
//! CORS. One write endpoint (the export) plus read-only views of the
//! manifest and element settings. Errors are JSON `{ error, details? }`.

pub mod elements;
pub mod export;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ErrorBody;
use crate::state::AppState;

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorBody>);

pub(crate) fn api_error(status: StatusCode, body: ErrorBody) -> ApiError {
    (status, Json(body))
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = state.config.export.body_limit_bytes;

    Router::new()
        .route("/api/export-layout", post(export::export_layout))
        .route("/api/manifest", get(elements::manifest))
        .route("/api/elements/{name}/settings", get(elements::element_settings))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
