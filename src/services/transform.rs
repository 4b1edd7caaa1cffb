//! # Transform Adapters
//!
//! One adapter per tool. Each reads a stored file, applies a single operation
//! and writes exactly one new file whose name follows the naming rules in
//! [`crate::utils::naming`]. Sources are never modified.
//!
//! Decoding, pixel work and encoding run on the blocking thread pool.

use std::sync::Arc;

use image::{DynamicImage, ImageFormat, imageops::FilterType};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::models::{CropArea, Dimensions, Flips};
use crate::services::background::{BackgroundRemover, RemovalError};
use crate::services::storage::{Storage, StorageError};
use crate::utils::constant::MAX_THUMBNAIL_DIMENSION;
use crate::utils::imaging::ImageProcessor;
use crate::utils::naming;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("source image not found")]
    NotFound,

    #[error("invalid file name")]
    InvalidName,

    #[error("invalid parameters: {0}")]
    InvalidParameters(&'static str),

    #[error("failed to decode image: {0}")]
    DecodeFailure(#[source] image::ImageError),

    #[error("failed to encode image: {0}")]
    EncodeFailure(#[source] image::ImageError),

    #[error("failed to read source file: {0}")]
    ReadFailure(#[source] StorageError),

    #[error("failed to write derived file: {0}")]
    WriteFailure(#[source] StorageError),

    #[error("background removal failed: {0}")]
    UpstreamFailure(#[from] RemovalError),

    #[error("transform task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Crop rectangle as requested by a client, before bounds checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl CropRect {
    /// Returns the rectangle as a [`CropArea`] if it lies fully inside `bounds`.
    pub fn within(&self, bounds: Dimensions) -> Option<CropArea> {
        let right = self.x.checked_add(self.width)?;
        let bottom = self.y.checked_add(self.height)?;

        if self.x < 0
            || self.y < 0
            || right > i64::from(bounds.width)
            || bottom > i64::from(bounds.height)
        {
            return None;
        }

        Some(CropArea {
            x: u32::try_from(self.x).ok()?,
            y: u32::try_from(self.y).ok()?,
            width: u32::try_from(self.width).ok()?,
            height: u32::try_from(self.height).ok()?,
        })
    }
}

/// Exact output size of a thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSize {
    width: u32,
    height: u32,
}

impl ThumbnailSize {
    /// Both edges are required, positive and at most [`MAX_THUMBNAIL_DIMENSION`].
    pub fn new(width: Option<i64>, height: Option<i64>) -> Result<Self, TransformError> {
        let (Some(width), Some(height)) = (width, height) else {
            return Err(TransformError::InvalidParameters("Invalid dimensions provided"));
        };
        if width <= 0 || height <= 0 {
            return Err(TransformError::InvalidParameters("Invalid dimensions provided"));
        }

        let max = i64::from(MAX_THUMBNAIL_DIMENSION);
        if width > max || height > max {
            return Err(TransformError::InvalidParameters(
                "Maximum dimensions are 2000x2000 pixels",
            ));
        }

        Ok(Self {
            width: width as u32,
            height: height as u32,
        })
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }
}

/// The file a transform produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    pub filename: String,
    pub dimensions: Dimensions,
}

/// Outcome of a crop, which also reports the source size and the applied area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropOutcome {
    pub result: TransformResult,
    pub original: Dimensions,
    pub area: CropArea,
}

/// The four transform adapters, bound to one Storage Area.
pub struct ImageTransformer {
    storage: Arc<dyn Storage>,
    remover: Arc<dyn BackgroundRemover>,
}

impl ImageTransformer {
    pub fn new(storage: Arc<dyn Storage>, remover: Arc<dyn BackgroundRemover>) -> Self {
        Self { storage, remover }
    }

    async fn load(&self, source: &str) -> Result<Vec<u8>, TransformError> {
        self.storage.get(source).await.map_err(|e| match e {
            StorageError::NotFound(_) => TransformError::NotFound,
            StorageError::InvalidName(_) => TransformError::InvalidName,
            other => TransformError::ReadFailure(other),
        })
    }

    async fn store(&self, name: &str, data: &[u8]) -> Result<(), TransformError> {
        self.storage
            .put(name, data)
            .await
            .map_err(TransformError::WriteFailure)
    }

    /// Crops `source` to `rect` and stores `{stem}_cropped.{ext}`.
    #[instrument(skip_all, fields(source = %source, rect = ?rect))]
    pub async fn crop(&self, source: &str, rect: CropRect) -> Result<CropOutcome, TransformError> {
        if rect.width <= 0 || rect.height <= 0 {
            return Err(TransformError::InvalidParameters("Invalid crop dimensions"));
        }

        let data = self.load(source).await?;
        let (_, extension) = naming::split_name(source);
        let extension = extension.to_string();

        let (encoded, original, area) = tokio::task::spawn_blocking(move || {
            let image = ImageProcessor::decode(&data).map_err(TransformError::DecodeFailure)?;
            let original = Dimensions::of(&image);
            let area = rect.within(original).ok_or(TransformError::InvalidParameters(
                "Crop area is outside image boundaries",
            ))?;

            let cropped = image.crop_imm(area.x, area.y, area.width, area.height);
            let encoded = ImageProcessor::encode(&cropped, &extension)
                .map_err(TransformError::EncodeFailure)?;
            Ok::<_, TransformError>((encoded, original, area))
        })
        .await??;

        let filename = naming::cropped_filename(source);
        self.store(&filename, &encoded).await?;

        info!(cropped = %filename, ?area, "Image cropped");
        Ok(CropOutcome {
            result: TransformResult {
                filename,
                dimensions: Dimensions {
                    width: area.width,
                    height: area.height,
                },
            },
            original,
            area,
        })
    }

    /// Mirrors `source` and stores `{stem}_flipped.{ext}`.
    ///
    /// With no flip requested the image is still re-encoded into a new file.
    #[instrument(skip_all, fields(source = %source, flips = ?flips))]
    pub async fn flip(&self, source: &str, flips: Flips) -> Result<TransformResult, TransformError> {
        let data = self.load(source).await?;
        let (_, extension) = naming::split_name(source);
        let extension = extension.to_string();

        let (encoded, dimensions) = tokio::task::spawn_blocking(move || {
            let mut image = ImageProcessor::decode(&data).map_err(TransformError::DecodeFailure)?;
            if flips.horizontal {
                image = image.fliph();
            }
            if flips.vertical {
                image = image.flipv();
            }

            let encoded =
                ImageProcessor::encode(&image, &extension).map_err(TransformError::EncodeFailure)?;
            Ok::<_, TransformError>((encoded, Dimensions::of(&image)))
        })
        .await??;

        let filename = naming::flipped_filename(source);
        self.store(&filename, &encoded).await?;

        info!(flipped = %filename, ?flips, "Image flipped");
        Ok(TransformResult {
            filename,
            dimensions,
        })
    }

    /// Resizes `source` to exactly `size` and stores `{stem}_thumbnail_{w}x{h}.{ext}`.
    ///
    /// Aspect ratio is not preserved. Transparent sources are flattened onto
    /// white before resampling.
    #[instrument(skip_all, fields(source = %source))]
    pub async fn thumbnail(
        &self,
        source: &str,
        size: ThumbnailSize,
    ) -> Result<TransformResult, TransformError> {
        let data = self.load(source).await?;
        let (_, extension) = naming::split_name(source);
        let extension = extension.to_string();

        let encoded = tokio::task::spawn_blocking(move || {
            let image = ImageProcessor::decode(&data).map_err(TransformError::DecodeFailure)?;
            let opaque = if image.color().has_alpha() {
                ImageProcessor::flatten_onto_white(&image)
            } else {
                DynamicImage::ImageRgb8(image.to_rgb8())
            };

            let resized = opaque.resize_exact(size.width, size.height, FilterType::Lanczos3);
            ImageProcessor::encode(&resized, &extension).map_err(TransformError::EncodeFailure)
        })
        .await??;

        let filename = naming::thumbnail_filename(source, size.width, size.height);
        self.store(&filename, &encoded).await?;

        info!(thumbnail = %filename, "Thumbnail generated");
        Ok(TransformResult {
            filename,
            dimensions: size.dimensions(),
        })
    }

    /// Runs the segmentation backend on `source` and stores `{stem}_no_bg.png`.
    ///
    /// The backend output is stored as-is; only its header is read, to confirm
    /// it is a PNG that carries an alpha channel and to get its dimensions.
    #[instrument(skip_all, fields(source = %source))]
    pub async fn remove_background(&self, source: &str) -> Result<TransformResult, TransformError> {
        let data = self.load(source).await?;
        debug!(input_size = data.len(), "Delegating to segmentation backend");

        let output = self.remover.remove(data).await?;
        if image::guess_format(&output).ok() != Some(ImageFormat::Png) {
            warn!(output_size = output.len(), "Segmentation output is not a PNG");
            return Err(RemovalError::NotPng.into());
        }
        let (dimensions, color) = ImageProcessor::header(&output)
            .map_err(|e| TransformError::UpstreamFailure(e.into()))?;
        if !color.has_alpha() {
            warn!(?color, "Segmentation output has no alpha channel");
            return Err(RemovalError::MissingAlpha.into());
        }

        let filename = naming::background_removed_filename(source);
        self.store(&filename, &output).await?;

        info!(processed = %filename, "Background removed");
        Ok(TransformResult {
            filename,
            dimensions,
        })
    }
}
