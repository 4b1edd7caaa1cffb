//! # Background Removal Handler

use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use validator::Validate;

use crate::{
    error::AppResult,
    handlers::extract::{INVALID_BODY, json_body},
    models::{AppState, Dimensions},
    utils::constant::IMAGE_URL_PREFIX,
};

#[derive(Debug, Deserialize, Validate)]
pub struct RemoveBackgroundRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct RemoveBackgroundResponse {
    pub success: bool,
    pub processed_filename: String,
    pub processed_url: String,
    pub original_filename: String,
    pub dimensions: Dimensions,
}

/// Removes the background of a stored image.
///
/// POST /remove_background
///
/// The result is always a PNG named `{stem}_no_bg.png`. The request holds its
/// worker until the segmentation backend answers.
///
/// # Returns
///
/// - `200 OK` with [`RemoveBackgroundResponse`]
/// - `400 Bad Request` - Missing filename
/// - `404 Not Found` - Source image does not exist
/// - `500 Internal Server Error` - Segmentation backend or storage failure
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn remove_background(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RemoveBackgroundRequest>, JsonRejection>,
) -> AppResult<Json<RemoveBackgroundResponse>> {
    let request = json_body(&state, payload, INVALID_BODY)?;
    debug!(filename = %request.filename, "Processing background removal request");

    let result = state.transformer.remove_background(&request.filename).await?;

    Ok(Json(RemoveBackgroundResponse {
        success: true,
        processed_url: format!("{IMAGE_URL_PREFIX}{}", result.filename),
        processed_filename: result.filename,
        original_filename: request.filename,
        dimensions: result.dimensions,
    }))
}
