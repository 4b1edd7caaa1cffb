//! # Thumbnail Handler
//!
//! Resizes an uploaded image to an exact size. The aspect ratio is not kept.

use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use validator::Validate;

use crate::{
    error::AppResult,
    handlers::extract::json_body,
    models::{AppState, Dimensions},
    services::transform::ThumbnailSize,
    utils::constant::IMAGE_URL_PREFIX,
};

#[derive(Debug, Deserialize, Validate)]
pub struct ThumbnailRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub filename: String,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ThumbnailResponse {
    pub success: bool,
    pub thumbnail_filename: String,
    pub thumbnail_url: String,
    pub dimensions: Dimensions,
    pub original_filename: String,
}

/// Generates a thumbnail of exactly `width` x `height` pixels.
///
/// POST /generate_thumbnail
///
/// # Returns
///
/// - `200 OK` with [`ThumbnailResponse`] - Stored as `{stem}_thumbnail_{w}x{h}.{ext}`
/// - `400 Bad Request` - Missing filename, missing or non-positive edges, or an
///   edge above 2000 pixels
/// - `404 Not Found` - Source image does not exist
/// - `500 Internal Server Error` - Encoding or storage failure
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn generate_thumbnail(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ThumbnailRequest>, JsonRejection>,
) -> AppResult<Json<ThumbnailResponse>> {
    let request = json_body(&state, payload, "Invalid dimensions provided")?;
    debug!(
        filename = %request.filename,
        width = ?request.width,
        height = ?request.height,
        "Processing thumbnail request"
    );

    let size = ThumbnailSize::new(request.width, request.height)?;
    let result = state.transformer.thumbnail(&request.filename, size).await?;

    Ok(Json(ThumbnailResponse {
        success: true,
        thumbnail_url: format!("{IMAGE_URL_PREFIX}{}", result.filename),
        thumbnail_filename: result.filename,
        dimensions: result.dimensions,
        original_filename: request.filename,
    }))
}
