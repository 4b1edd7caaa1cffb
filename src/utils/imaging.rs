//! # Image Codec Helpers
//!
//! Decoding, alpha flattening and format-aware encoding shared by the transform
//! adapters. The pixel work itself is delegated to the `image` crate.

use std::io::Cursor;

use image::{
    ColorType, DynamicImage, ImageDecoder, ImageError, ImageFormat, ImageReader, Rgba, RgbaImage,
    codecs::jpeg::JpegEncoder, imageops,
};
use tracing::trace;

use crate::models::Dimensions;
use crate::utils::constant::JPEG_QUALITY;

/// Provides image decoding and encoding utilities for the adapters.
pub struct ImageProcessor;

impl ImageProcessor {
    /// Decodes an image, detecting the format from its content.
    pub fn decode(data: &[u8]) -> Result<DynamicImage, ImageError> {
        let image = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .decode()?;
        trace!(width = image.width(), height = image.height(), "Image decoded");
        Ok(image)
    }

    /// Reads pixel dimensions and colour type from the header without decoding pixel data.
    pub fn header(data: &[u8]) -> Result<(Dimensions, ColorType), ImageError> {
        let decoder = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_decoder()?;
        let (width, height) = decoder.dimensions();
        Ok((Dimensions { width, height }, decoder.color_type()))
    }

    /// Encoding used for a stored extension. Unknown extensions fall back to JPEG.
    pub fn format_for_extension(extension: &str) -> ImageFormat {
        match extension.to_ascii_lowercase().as_str() {
            "png" => ImageFormat::Png,
            "gif" => ImageFormat::Gif,
            "bmp" => ImageFormat::Bmp,
            "webp" => ImageFormat::WebP,
            _ => ImageFormat::Jpeg,
        }
    }

    /// Composites the image over an opaque white canvas, dropping the alpha channel.
    pub fn flatten_onto_white(image: &DynamicImage) -> DynamicImage {
        let mut canvas = RgbaImage::from_pixel(
            image.width(),
            image.height(),
            Rgba([255, 255, 255, 255]),
        );
        imageops::overlay(&mut canvas, &image.to_rgba8(), 0, 0);
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
    }

    /// Encodes the image for the given extension.
    ///
    /// JPEG targets are flattened onto white when the image carries alpha and
    /// written at [`JPEG_QUALITY`]. Other targets are normalised to 8-bit RGB
    /// or RGBA first so every encoder accepts them.
    pub fn encode(image: &DynamicImage, extension: &str) -> Result<Vec<u8>, ImageError> {
        let format = Self::format_for_extension(extension);
        let mut buffer = Vec::new();

        match format {
            ImageFormat::Jpeg => {
                let opaque = if image.color().has_alpha() {
                    Self::flatten_onto_white(image)
                } else {
                    DynamicImage::ImageRgb8(image.to_rgb8())
                };
                let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
                opaque.write_with_encoder(encoder)?;
            }
            other => {
                let normalized = if image.color().has_alpha() {
                    DynamicImage::ImageRgba8(image.to_rgba8())
                } else {
                    DynamicImage::ImageRgb8(image.to_rgb8())
                };
                normalized.write_to(&mut Cursor::new(&mut buffer), other)?;
            }
        }

        trace!(?format, size = buffer.len(), "Image encoded");
        Ok(buffer)
    }
}
