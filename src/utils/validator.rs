//! # Upload Validation
//!
//! Pure checks applied to an upload before anything touches the Storage Area.
//! The size is the number of bytes actually received, never a client header.

use thiserror::Error;
use tracing::trace;

use crate::models::Dimensions;
use crate::utils::constant::ALLOWED_EXTENSIONS;
use crate::utils::imaging::ImageProcessor;
use crate::utils::naming::extension_of;

/// Reasons an upload is turned away.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("no file provided")]
    MissingFile,

    #[error("extension not allowed")]
    ExtensionNotAllowed,

    #[error("file of {size} bytes exceeds the {limit} byte ceiling")]
    TooLarge { size: usize, limit: usize },

    #[error("upload is empty")]
    Empty,

    #[error("upload is not a decodable image")]
    Undecodable,
}

/// An upload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedUpload {
    /// Lowercased extension taken from the client name.
    pub extension: String,
}

/// Provides validation utilities for upload handlers.
pub struct UploadValidator;

impl UploadValidator {
    /// Checks the candidate name and measured size against upload policy.
    ///
    /// The extension is checked before the size. `ceiling` is the per-route
    /// limit; routes without one pass `None` and rely on the request ceiling.
    pub fn validate(
        candidate_name: &str,
        size: usize,
        ceiling: Option<usize>,
    ) -> Result<AcceptedUpload, UploadError> {
        let extension = extension_of(candidate_name)
            .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .ok_or(UploadError::ExtensionNotAllowed)?;

        if let Some(limit) = ceiling.filter(|limit| size > *limit) {
            return Err(UploadError::TooLarge { size, limit });
        }

        if size == 0 {
            return Err(UploadError::Empty);
        }

        trace!(extension = %extension, size, "Upload accepted");
        Ok(AcceptedUpload { extension })
    }

    /// Fully decodes the upload and returns its pixel dimensions.
    ///
    /// A readable header is not enough: truncated or corrupt pixel data is
    /// rejected here. CPU-bound, so callers run it on the blocking pool.
    pub fn probe_dimensions(data: &[u8]) -> Result<Dimensions, UploadError> {
        ImageProcessor::decode(data)
            .map(|image| Dimensions::of(&image))
            .map_err(|e| {
                trace!(error = %e, "Upload failed to decode");
                UploadError::Undecodable
            })
    }
}
