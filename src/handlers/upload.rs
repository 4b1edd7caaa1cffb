//! # Upload Handlers
//!
//! HTTP handlers that accept an image into the Storage Area. The three routes
//! share one flow and differ only in the storage name prefix and whether the
//! tighter per-file ceiling applies:
//!
//! 1. The `file` field is read in full; its byte count is the measured size
//! 2. Extension and size are validated before anything is written
//! 3. The image is fully decoded on the blocking pool; its dimensions are reported
//! 4. The bytes are stored under a name carrying a fresh unique token

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    error::{AppError, AppResult},
    models::{AppState, Dimensions},
    utils::{
        constant::{IMAGE_URL_PREFIX, UPLOAD_FIELD},
        naming::{self, UniqueToken, UploadPurpose},
        validator::{UploadError, UploadValidator},
    },
};

/// Response structure for a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
    pub original_filename: String,
    pub image_url: String,
    pub dimensions: Dimensions,
}

/// Uploads an image for the crop tool.
///
/// POST /upload_image_for_crop MultipartForm
///
/// Stored as `crop_{token}.{ext}`. The per-file tool ceiling applies.
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn upload_image_for_crop(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let ceiling = Some(state.config.max_tool_upload_bytes);
    accept_upload(&state, multipart, UploadPurpose::Crop, ceiling).await
}

/// Uploads an image for the flip and thumbnail tools.
///
/// POST /upload_image MultipartForm
///
/// Stored as `{token}.{ext}`. Only the request ceiling applies.
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    accept_upload(&state, multipart, UploadPurpose::Generic, None).await
}

/// Uploads an image for the background-removal tool.
///
/// POST /upload_image_for_background MultipartForm
///
/// Stored as `bg_remove_{token}.{ext}`. The per-file tool ceiling applies.
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn upload_image_for_background(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let ceiling = Some(state.config.max_tool_upload_bytes);
    accept_upload(&state, multipart, UploadPurpose::BackgroundRemoval, ceiling).await
}

/// Maps a multipart read failure, keeping the framework's 413 for oversized bodies.
pub(crate) fn multipart_error(state: &AppState, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(error = %e, "Request body exceeds ceiling");
        AppError::PayloadTooLarge {
            limit: state.config.max_request_bytes,
        }
    } else {
        error!(error = %e, "Error reading multipart form");
        AppError::BadRequest("Invalid multipart data")
    }
}

/// Reads the `file` field, returning the client name and its bytes.
async fn read_file_field(
    state: &AppState,
    multipart: &mut Multipart,
) -> AppResult<(String, Bytes)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(state, e))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            warn!(field_name = ?field.name(), "Unknown field in multipart form");
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| multipart_error(state, e))?;
        return Ok((file_name, data));
    }

    warn!("No file provided in multipart form");
    Err(UploadError::MissingFile.into())
}

async fn accept_upload(
    state: &AppState,
    mut multipart: Multipart,
    purpose: UploadPurpose,
    ceiling: Option<usize>,
) -> AppResult<Json<UploadResponse>> {
    debug!(?purpose, "Processing upload request");

    let (client_name, data) = read_file_field(state, &mut multipart).await?;

    let accepted = UploadValidator::validate(&client_name, data.len(), ceiling).inspect_err(
        |e| warn!(client_name = %client_name, size = data.len(), error = %e, "Upload rejected"),
    )?;

    let probe = data.clone();
    let dimensions = tokio::task::spawn_blocking(move || UploadValidator::probe_dimensions(&probe))
        .await
        .map_err(|e| {
            error!(error = %e, "Decode check task failed");
            AppError::Internal
        })?
        .inspect_err(|e| warn!(client_name = %client_name, error = %e, "Upload rejected"))?;

    let filename = naming::upload_filename(purpose, UniqueToken::generate(), &accepted.extension);
    state.storage.put(&filename, &data).await?;

    info!(
        file = %filename,
        file_size = data.len(),
        width = dimensions.width,
        height = dimensions.height,
        "Image uploaded successfully"
    );

    Ok(Json(UploadResponse {
        success: true,
        image_url: format!("{IMAGE_URL_PREFIX}{filename}"),
        filename,
        original_filename: naming::sanitize_filename(&client_name),
        dimensions,
    }))
}
