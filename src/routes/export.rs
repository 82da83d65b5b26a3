//! `POST /api/export-layout`: instance list in, zip download out.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tracing::{error, info, warn};

use super::{ApiError, api_error};
use crate::error::{ErrorBody, ErrorCode};
use crate::export::ZIP_FILE_NAME;
use crate::state::AppState;

pub const MISSING_ELEMENTS: &str = "Missing elements data in request body";
pub const ELEMENTS_NOT_ARRAY: &str = "Elements data must be an array.";
pub const EXPORT_FAILED: &str = "Failed to generate layout export.";
pub const SEND_FAILED: &str = "Failed to send the zip file.";

/// Body must be `{ "elements": [...] }`. Element shape is not checked here;
/// bad instances surface as placeholders or build failures later.
pub async fn export_layout(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        warn!(error = %rejection, "rejected export request body");
        api_error(rejection.status(), ErrorBody::new("Invalid request body.").with_details(rejection.body_text()))
    })?;
    let elements = elements_of(&body)?;

    info!(instances = elements.len(), "received request to export layout");
    let artifact = state.pipeline.run(elements).await.map_err(|e| {
        error!(error = %e, code = e.error_code(), "failed to generate layout export");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new(EXPORT_FAILED).with_details(e.to_string()))
    })?;

    let bytes = match tokio::fs::read(&artifact.zip_path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(zip = %artifact.zip_path.display(), error = %e, "error sending file");
            state.pipeline.release(&artifact, false).await;
            return Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new(SEND_FAILED)));
        }
    };
    state.pipeline.release(&artifact, true).await;
    info!(bytes = bytes.len(), "zip file sent");

    Ok((
        [
            (CONTENT_TYPE, "application/zip".to_owned()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{ZIP_FILE_NAME}\"")),
        ],
        bytes,
    )
        .into_response())
}

/// The `elements` array of a request body.
pub(crate) fn elements_of(body: &Value) -> Result<&[Value], ApiError> {
    match body.get("elements") {
        None | Some(Value::Null) => Err(api_error(StatusCode::BAD_REQUEST, ErrorBody::new(MISSING_ELEMENTS))),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(api_error(StatusCode::BAD_REQUEST, ErrorBody::new(ELEMENTS_NOT_ARRAY))),
    }
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
