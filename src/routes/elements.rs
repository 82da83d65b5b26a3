//! Read-only element views: the manifest and per-element settings.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::error;

use super::{ApiError, api_error};
use crate::element::{Resolved, Settings, is_safe_type_name};
use crate::error::{ErrorBody, ErrorCode};
use crate::manifest::Manifest;
use crate::state::AppState;

/// `GET /api/manifest`
pub async fn manifest(State(state): State<AppState>) -> Json<Manifest> {
    Json(state.current_manifest())
}

/// `GET /api/elements/{name}/settings`
pub async fn element_settings(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Settings>, ApiError> {
    if !is_safe_type_name(&name) {
        return Err(api_error(StatusCode::BAD_REQUEST, ErrorBody::new("Invalid element name.")));
    }

    let registry = state.registry.clone();
    let lookup = name.clone();
    let resolved = tokio::task::spawn_blocking(move || registry.resolve(&lookup))
        .await
        .map_err(|e| {
            error!(error = %e, "settings lookup task failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new("Failed to load element settings."))
        })?;

    match resolved {
        Ok(Resolved::Known(def)) => Ok(Json(def.settings)),
        Ok(Resolved::Unknown(_)) => Err(api_error(
            StatusCode::NOT_FOUND,
            ErrorBody::new(format!("Element not found: {name}")),
        )),
        Err(e) => {
            error!(element_type = %name, error = %e, code = e.error_code(), "failed to load element settings");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new("Failed to load element settings.").with_details(e.to_string()),
            ))
        }
    }
}

#[cfg(test)]
#[path = "elements_test.rs"]
mod tests;
