//! Image loading and pixel data

use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage};

use crate::error::{ImageError, Result};

/// Decoded RGBA8 image data ready for GPU upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Raw RGBA pixel data, rows top to bottom
    pixels: Vec<u8>,
    /// Image width in pixels
    width: u32,
    /// Image height in pixels
    height: u32,
}

impl ImageData {
    /// Create ImageData from raw RGBA pixels
    pub fn from_rgba(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidDimensions { width, height });
        }
        let expected_len = width as usize * height as usize * 4;
        if pixels.len() != expected_len {
            return Err(ImageError::Decode(format!(
                "Invalid pixel data length: expected {}, got {}",
                expected_len,
                pixels.len()
            )));
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Load and decode an image file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| ImageError::FileLoad(format!("{}: {}", path.display(), e)))?;
        let image = Self::from_bytes(&data)?;
        tracing::debug!(
            "Loaded image {} ({}x{})",
            path.display(),
            image.width,
            image.height
        );
        Ok(image)
    }

    /// Decode image from raw encoded bytes (PNG, JPEG, BMP)
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)?;
        Self::from_dynamic_image(img)
    }

    /// Convert a DynamicImage to ImageData
    fn from_dynamic_image(img: DynamicImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidDimensions { width, height });
        }
        let pixels = img.to_rgba8().into_raw();

        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Encode as PNG and write to `path`
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let buffer = RgbaImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or(
            ImageError::InvalidDimensions {
                width: self.width,
                height: self.height,
            },
        )?;
        buffer
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| ImageError::Encode(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("Wrote {} ({}x{})", path.display(), self.width, self.height);
        Ok(())
    }

    /// RGBA value of the pixel at `(x, y)`, `None` when out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Get the raw RGBA pixel data
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get image dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Take ownership of the pixel data
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_from_rgba() {
        let pixels = vec![
            255, 0, 0, 255, // Red
            0, 255, 0, 255, // Green
            0, 0, 255, 255, // Blue
            255, 255, 255, 0, // Clear white
        ];

        let data = ImageData::from_rgba(pixels, 2, 2).unwrap();
        assert_eq!(data.dimensions(), (2, 2));
        assert_eq!(data.pixel(1, 0), Some([0, 255, 0, 255]));
        assert_eq!(data.pixel(1, 1), Some([255, 255, 255, 0]));
        assert_eq!(data.pixel(2, 0), None);
    }

    #[test]
    fn test_invalid_rgba_length() {
        let pixels = vec![255, 0, 0, 255]; // Only 1 pixel for 2x2
        assert!(ImageData::from_rgba(pixels, 2, 2).is_err());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            ImageData::from_rgba(Vec::new(), 0, 4),
            Err(ImageError::InvalidDimensions { width: 0, height: 4 })
        ));
    }

    #[test]
    fn test_decode_png_bytes() {
        let source = RgbaImage::from_raw(3, 1, vec![10, 20, 30, 255, 0, 0, 0, 0, 1, 2, 3, 4])
            .unwrap();
        let mut encoded = Vec::new();
        DynamicImage::ImageRgba8(source)
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .unwrap();

        let data = ImageData::from_bytes(&encoded).unwrap();
        assert_eq!(data.dimensions(), (3, 1));
        assert_eq!(data.pixel(0, 0), Some([10, 20, 30, 255]));
        assert_eq!(data.pixel(2, 0), Some([1, 2, 3, 4]));
    }

    #[test]
    fn test_garbage_bytes_fail() {
        assert!(matches!(
            ImageData::from_bytes(b"not an image"),
            Err(ImageError::Decode(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ImageData::load("/definitely/not/here.png"),
            Err(ImageError::FileLoad(_))
        ));
    }
}
