//! Shared request-body helpers for the tool endpoints.

use axum::{Json, extract::rejection::JsonRejection, http::StatusCode};
use tracing::warn;
use validator::Validate;

use crate::{error::AppError, models::AppState};

/// Message for a JSON body that does not have the expected shape.
pub(crate) const INVALID_BODY: &str = "Invalid request body";

/// Unwraps a JSON body and runs its field validation.
///
/// A body sent without a JSON content type is reported as missing and oversized
/// bodies keep their 413. Anything else the extractor rejects is reported with
/// `malformed`. The filename is the only validated field, so a validation
/// failure is reported as a missing filename.
pub(crate) fn json_body<T: Validate>(
    state: &AppState,
    payload: Result<Json<T>, JsonRejection>,
    malformed: &'static str,
) -> Result<T, AppError> {
    let Json(body) = payload.map_err(|rejection| {
        warn!(error = %rejection, "Rejected request body");
        match rejection {
            JsonRejection::MissingJsonContentType(_) => AppError::BadRequest("No data provided"),
            other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                AppError::PayloadTooLarge {
                    limit: state.config.max_request_bytes,
                }
            }
            _ => AppError::BadRequest(malformed),
        }
    })?;

    body.validate().map_err(|errors| {
        warn!(%errors, "Request body failed validation");
        AppError::BadRequest("No filename provided")
    })?;

    Ok(body)
}
