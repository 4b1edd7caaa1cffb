//! # Crop Handler
//!
//! Applies a client-chosen rectangle to an uploaded image.

use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use validator::Validate;

use crate::{
    error::AppResult,
    handlers::extract::json_body,
    models::{AppState, CropArea, Dimensions},
    services::transform::CropRect,
    utils::constant::IMAGE_URL_PREFIX,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CropRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub filename: String,
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
    #[serde(default)]
    pub width: i64,
    #[serde(default)]
    pub height: i64,
}

#[derive(Debug, Serialize)]
pub struct CropResponse {
    pub success: bool,
    pub cropped_filename: String,
    pub cropped_url: String,
    pub original_size: Dimensions,
    pub cropped_size: Dimensions,
    pub crop_area: CropArea,
}

/// Crops a stored image.
///
/// POST /process_crop
///
/// # Returns
///
/// - `200 OK` with [`CropResponse`] - Cropped image stored as `{stem}_cropped.{ext}`
/// - `400 Bad Request` - Missing filename, non-integer values, or a rectangle
///   that is empty or extends past the image
/// - `404 Not Found` - Source image does not exist
/// - `500 Internal Server Error` - Encoding or storage failure
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn process_crop(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CropRequest>, JsonRejection>,
) -> AppResult<Json<CropResponse>> {
    let request = json_body(
        &state,
        payload,
        "Invalid crop parameters - must be integers",
    )?;
    debug!(filename = %request.filename, "Processing crop request");

    let rect = CropRect {
        x: request.x,
        y: request.y,
        width: request.width,
        height: request.height,
    };
    let outcome = state.transformer.crop(&request.filename, rect).await?;

    Ok(Json(CropResponse {
        success: true,
        cropped_url: format!("{IMAGE_URL_PREFIX}{}", outcome.result.filename),
        cropped_filename: outcome.result.filename,
        original_size: outcome.original,
        cropped_size: outcome.result.dimensions,
        crop_area: outcome.area,
    }))
}
