//! Image error types

use thiserror::Error;

/// Errors that can occur while loading or saving images
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to load image file: {0}")]
    FileLoad(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

impl From<image::ImageError> for ImageError {
    fn from(err: image::ImageError) -> Self {
        ImageError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ImageError>;
