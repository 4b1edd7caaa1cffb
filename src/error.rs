//! # Centralized Error Handling
//!
//! This module provides a unified error handling system for the application.
//! It centralizes error logging and HTTP response generation, eliminating
//! repetitive error handling patterns throughout the codebase.
//!
//! Client-facing messages are fixed strings. The underlying error of every
//! server-side failure is logged here and never echoed to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::services::storage::StorageError;
use crate::services::transform::TransformError;
use crate::utils::validator::UploadError;

const KIB: usize = 1024;
const MIB: usize = 1024 * KIB;

/// Human-readable ceiling, rounded up so the label never understates it.
fn size_label(bytes: usize) -> String {
    if bytes >= MIB {
        format!("{}MB", bytes.div_ceil(MIB))
    } else {
        format!("{}KB", bytes.div_ceil(KIB))
    }
}

/// Central application error type that encompasses all possible error conditions.
///
/// This enum provides a unified way to handle errors across the application,
/// with automatic conversion to appropriate HTTP responses. _Server-side failures
/// are logged automatically, client errors should be logged where they are detected._
#[derive(Error, Debug)]
pub enum AppError {
    #[error("upload rejected: {0}")]
    Upload(#[from] UploadError),

    #[error("transform failed: {0}")]
    Transform(#[from] TransformError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("bad request: {0}")]
    BadRequest(&'static str),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("internal server error")]
    Internal,
}

impl AppError {
    /// Status code and client-facing message for this error.
    fn parts(&self) -> (StatusCode, String) {
        match self {
            AppError::Upload(e) => (StatusCode::BAD_REQUEST, upload_message(e)),
            AppError::Transform(e) => transform_parts(e),
            AppError::Storage(StorageError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "File not found".into())
            }
            AppError::Storage(StorageError::InvalidName(_)) => {
                (StatusCode::BAD_REQUEST, "Invalid filename".into())
            }
            AppError::Storage(StorageError::Io(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, (*msg).into()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, (*msg).into()),
            AppError::PayloadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("File too large. Maximum size is {}.", size_label(*limit)),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".into(),
            ),
        }
    }

    fn log_if_server_error(&self, status: StatusCode) {
        if status.is_server_error() {
            // Log detailed errors for internal tracking
            error!(error = ?self, "Request failed with server error");
        }
    }
}

fn upload_message(e: &UploadError) -> String {
    match e {
        UploadError::MissingFile => "No file provided".into(),
        UploadError::ExtensionNotAllowed => {
            "Invalid file type. Supported formats: PNG, JPG, JPEG, GIF, BMP, WEBP".into()
        }
        UploadError::TooLarge { limit, .. } => {
            format!("File size must be less than {}", size_label(*limit))
        }
        UploadError::Empty => "Empty file not allowed".into(),
        UploadError::Undecodable => "File is not a valid image".into(),
    }
}

fn transform_parts(e: &TransformError) -> (StatusCode, String) {
    match e {
        TransformError::NotFound => (StatusCode::NOT_FOUND, "Image file not found".into()),
        TransformError::InvalidName => (StatusCode::BAD_REQUEST, "Invalid filename".into()),
        TransformError::InvalidParameters(msg) => (StatusCode::BAD_REQUEST, (*msg).into()),
        TransformError::DecodeFailure(_) => (
            StatusCode::BAD_REQUEST,
            "Image file could not be decoded".into(),
        ),
        TransformError::UpstreamFailure(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error removing background".into(),
        ),
        TransformError::EncodeFailure(_)
        | TransformError::ReadFailure(_)
        | TransformError::WriteFailure(_)
        | TransformError::Task(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error processing image".into(),
        ),
    }
}

/// Body of the `{success: false, error}` responses returned by the tool endpoints.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.parts();
        self.log_if_server_error(status);

        let body = Json(ErrorBody {
            success: false,
            error,
        });
        (status, body).into_response()
    }
}

/// Renders an [`AppError`] as a bare `{error}` body, the shape used by the
/// file-serving endpoints.
#[derive(Debug)]
pub struct PlainError(pub AppError);

#[derive(Serialize)]
struct PlainErrorBody {
    error: String,
}

impl From<AppError> for PlainError {
    fn from(value: AppError) -> Self {
        PlainError(value)
    }
}

impl IntoResponse for PlainError {
    fn into_response(self) -> Response {
        let (status, error) = self.0.parts();
        self.0.log_if_server_error(status);
        (status, Json(PlainErrorBody { error })).into_response()
    }
}

/// Convenience Result type alias that uses AppError as the error type.
pub type AppResult<T> = Result<T, AppError>;
