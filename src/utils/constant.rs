//! # Application Constants
//!
//! This module defines fixed policy values used throughout the service.
//! Values that operators may tune live in [`AppConfig`](crate::models::AppConfig) instead.

/// File extensions accepted by every upload route (compared lowercased).
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Default ceiling for a whole request body.
///
/// Bodies above this size are rejected by the framework with `413 Payload Too Large`.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 16 * 1024 * 1024;

/// Default ceiling for a single file on the crop and background-removal upload routes.
pub const DEFAULT_MAX_TOOL_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Largest edge, in pixels, a generated thumbnail may have.
pub const MAX_THUMBNAIL_DIMENSION: u32 = 2000;

/// Encoder quality used whenever the target format is JPEG.
pub const JPEG_QUALITY: u8 = 95;

/// Name of the service reported by the health check.
pub const SERVICE_NAME: &str = "thumbnail-tool";

/// Multipart field carrying the uploaded image.
pub const UPLOAD_FIELD: &str = "file";

/// URL prefix under which stored files are served inline.
pub const IMAGE_URL_PREFIX: &str = "/image/";
