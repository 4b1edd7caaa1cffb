//! # Background Segmentation
//!
//! Foreground/background segmentation is a black box behind [`BackgroundRemover`]:
//! encoded image bytes go in, PNG bytes with an alpha channel come out.
//!
//! ## Implementations
//!
//! - [`BorderKeyRemover`] - In-process fallback that keys out the border colour
//! - [`RembgHttpRemover`] - Delegates to a rembg-compatible HTTP server
//!
//! The backend is chosen at startup: setting `REMBG_API_URL` selects the HTTP
//! server, otherwise the in-process remover is used.

use std::io::Cursor;

use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};
use reqwest::multipart;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::utils::imaging::ImageProcessor;

/// Errors that can occur while removing a background
#[derive(Debug, Error)]
pub enum RemovalError {
    #[error("segmentation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("segmentation backend returned {status}: {body}")]
    Backend {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("segmentation backend did not return a PNG")]
    NotPng,

    #[error("segmentation output has no alpha channel")]
    MissingAlpha,

    #[error("segmentation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Trait for background segmentation backends
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Removes the background from an encoded image.
    ///
    /// # Errors
    ///
    /// Returns a [`RemovalError`] when the input cannot be processed or the
    /// backend fails.
    async fn remove(&self, input: Vec<u8>) -> Result<Vec<u8>, RemovalError>;
}

/// In-process remover that treats pixels close to the mean border colour as background.
///
/// Pixels within `tolerance` (Euclidean RGB distance) of the border colour become fully
/// transparent; pixels up to twice that distance fade in linearly. The output is always
/// an RGBA PNG, even for fully opaque sources.
#[derive(Debug, Clone, Copy)]
pub struct BorderKeyRemover {
    tolerance: f32,
}

impl Default for BorderKeyRemover {
    fn default() -> Self {
        Self { tolerance: 40.0 }
    }
}

impl BorderKeyRemover {
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }

    fn border_color(image: &RgbaImage) -> [f32; 3] {
        let (width, height) = image.dimensions();
        let mut sum = [0f64; 3];
        let mut count = 0f64;

        for (x, y, pixel) in image.enumerate_pixels() {
            if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                for (acc, channel) in sum.iter_mut().zip(pixel.0) {
                    *acc += f64::from(channel);
                }
                count += 1.0;
            }
        }

        let count = count.max(1.0);
        sum.map(|channel| (channel / count) as f32)
    }

    fn key_out(&self, mut image: RgbaImage) -> RgbaImage {
        let key = Self::border_color(&image);
        let tolerance = self.tolerance.max(f32::EPSILON);

        for Rgba([r, g, b, a]) in image.pixels_mut() {
            let distance = [*r, *g, *b]
                .iter()
                .zip(key)
                .map(|(channel, key)| (f32::from(*channel) - key).powi(2))
                .sum::<f32>()
                .sqrt();
            let coverage = ((distance - tolerance) / tolerance).clamp(0.0, 1.0);
            *a = (f32::from(*a) * coverage).round() as u8;
        }
        image
    }
}

#[async_trait]
impl BackgroundRemover for BorderKeyRemover {
    #[instrument(skip_all, fields(input_size = input.len()))]
    async fn remove(&self, input: Vec<u8>) -> Result<Vec<u8>, RemovalError> {
        let remover = *self;
        let output = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, RemovalError> {
            let rgba = ImageProcessor::decode(&input)?.to_rgba8();
            let keyed = remover.key_out(rgba);

            let mut buffer = Vec::new();
            keyed.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
            Ok(buffer)
        })
        .await??;

        debug!(output_size = output.len(), "Background keyed out in-process");
        Ok(output)
    }
}

/// Remover backed by a rembg-compatible HTTP server.
///
/// The image is posted as multipart field `file`; the response body is the PNG.
pub struct RembgHttpRemover {
    api_url: String,
    http_client: reqwest::Client,
}

impl RembgHttpRemover {
    /// Creates a new remover posting to `api_url` (e.g. `http://localhost:7000/api/remove`).
    pub fn new(api_url: String) -> Self {
        info!(api_url = %api_url, "Initializing rembg HTTP remover");

        Self {
            api_url,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl BackgroundRemover for RembgHttpRemover {
    #[instrument(skip_all, fields(api_url = %self.api_url, input_size = input.len()))]
    async fn remove(&self, input: Vec<u8>) -> Result<Vec<u8>, RemovalError> {
        debug!("Sending image to segmentation backend");

        let part = multipart::Part::bytes(input).file_name("image");
        let form = multipart::Form::new().part("file", part);
        let response = self
            .http_client
            .post(&self.api_url)
            .multipart(form)
            .send()
            .await
            .inspect_err(|e| error!(error = %e, "Network request to segmentation backend failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response body".to_string());
            error!(status = %status, error_body = %body, "Segmentation backend returned error");
            return Err(RemovalError::Backend { status, body });
        }

        let output = response.bytes().await?.to_vec();
        if image::guess_format(&output).ok() != Some(ImageFormat::Png) {
            error!(output_size = output.len(), "Segmentation backend returned non-PNG data");
            return Err(RemovalError::NotPng);
        }

        info!(output_size = output.len(), "Background removed by segmentation backend");
        Ok(output)
    }
}
