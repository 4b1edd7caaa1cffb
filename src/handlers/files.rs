//! # Image Serving Handlers
//!
//! Streams stored files back to clients, either inline or as an attachment
//! with a cleaned-up download name. Download names are cosmetic: the bytes
//! served are always the stored file's bytes.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;
use tracing::{debug, error, instrument, warn};

use crate::{
    error::{AppError, PlainError},
    models::AppState,
    services::storage::StorageError,
    utils::naming::{DownloadKind, content_type_for},
};

async fn open_stream(
    state: &AppState,
    filename: &str,
    missing: &'static str,
) -> Result<Body, PlainError> {
    let reader = state.storage.open(filename).await.map_err(|e| match e {
        StorageError::NotFound(_) => {
            debug!("Requested file does not exist");
            AppError::NotFound(missing)
        }
        other => {
            warn!(error = %other, "Failed to open stored file");
            AppError::from(other)
        }
    })?;
    Ok(Body::from_stream(ReaderStream::new(reader)))
}

/// Serves a stored file inline.
///
/// GET /image/{filename}
///
/// The content type comes from the stored extension, not from the bytes.
#[instrument(skip(state))]
pub async fn serve_image(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, PlainError> {
    let body = open_stream(&state, &filename, "Image not found").await?;
    Ok(([(header::CONTENT_TYPE, content_type_for(&filename))], body).into_response())
}

async fn download(
    state: &AppState,
    filename: &str,
    kind: DownloadKind,
) -> Result<Response, PlainError> {
    let body = open_stream(state, filename, "File not found").await?;

    let download_name = kind.download_name(filename);
    let content_type = kind
        .forced_content_type()
        .unwrap_or_else(|| content_type_for(filename));
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{download_name}\""))
        .map_err(|e| {
            error!(error = %e, download_name = %download_name, "Invalid download name");
            AppError::Internal
        })?;

    debug!(download_name = %download_name, "Serving download");
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// GET /download_cropped/{filename}
#[instrument(skip(state))]
pub async fn download_cropped(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, PlainError> {
    download(&state, &filename, DownloadKind::Cropped).await
}

/// GET /download_flipped/{filename}
#[instrument(skip(state))]
pub async fn download_flipped(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, PlainError> {
    download(&state, &filename, DownloadKind::Flipped).await
}

/// GET /download_thumbnail/{filename}
#[instrument(skip(state))]
pub async fn download_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, PlainError> {
    download(&state, &filename, DownloadKind::Thumbnail).await
}

/// GET /download_background_removed/{filename}
///
/// Always served as `image/png`.
#[instrument(skip(state))]
pub async fn download_background_removed(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, PlainError> {
    download(&state, &filename, DownloadKind::BackgroundRemoved).await
}
