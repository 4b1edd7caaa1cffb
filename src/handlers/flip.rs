//! # Flip Handler

use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use validator::Validate;

use crate::{
    error::AppResult,
    handlers::extract::{INVALID_BODY, json_body},
    models::{AppState, Flips},
    utils::constant::IMAGE_URL_PREFIX,
};

#[derive(Debug, Deserialize, Validate)]
pub struct FlipRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub filename: String,
    #[serde(default)]
    pub flip_horizontal: bool,
    #[serde(default)]
    pub flip_vertical: bool,
}

#[derive(Debug, Serialize)]
pub struct FlipResponse {
    pub success: bool,
    pub flipped_filename: String,
    pub flipped_url: String,
    pub flips_applied: Flips,
}

/// Mirrors a stored image horizontally, vertically, or both.
///
/// POST /flip_image
///
/// Requesting neither flip still writes a new `{stem}_flipped.{ext}` file.
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn flip_image(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FlipRequest>, JsonRejection>,
) -> AppResult<Json<FlipResponse>> {
    let request = json_body(&state, payload, INVALID_BODY)?;
    let flips = Flips {
        horizontal: request.flip_horizontal,
        vertical: request.flip_vertical,
    };
    debug!(filename = %request.filename, ?flips, "Processing flip request");

    let result = state.transformer.flip(&request.filename, flips).await?;

    Ok(Json(FlipResponse {
        success: true,
        flipped_url: format!("{IMAGE_URL_PREFIX}{}", result.filename),
        flipped_filename: result.filename,
        flips_applied: flips,
    }))
}
