use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};

/// Pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn of(image: &DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height }
    }
}

/// A crop rectangle that has been checked against the source image bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropArea {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Which flips were applied to an image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flips {
    pub horizontal: bool,
    pub vertical: bool,
}
