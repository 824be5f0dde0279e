//! Font loading and metrics

use std::path::Path;
use std::sync::Arc;

use crate::{Result, TextError};

/// Vertical font metrics in font units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Units per em
    pub units_per_em: u16,
    /// Ascender (positive, above baseline)
    pub ascender: i16,
    /// Descender (negative, below baseline)
    pub descender: i16,
    /// Line gap
    pub line_gap: i16,
}

impl FontMetrics {
    /// Scale factor that makes ascender-to-descender span `pixel_height` pixels
    pub fn scale_for_pixel_height(&self, pixel_height: f32) -> f32 {
        let span = (self.ascender as i32 - self.descender as i32).max(1);
        pixel_height / span as f32
    }

    /// Baseline-to-baseline distance in font units
    pub fn line_height(&self) -> f32 {
        (self.ascender as i32 - self.descender as i32 + self.line_gap as i32) as f32
    }
}

/// A parsed font face
#[derive(Clone)]
pub struct FontFace {
    /// Raw font data
    data: Arc<Vec<u8>>,
    /// Face index within the font file
    face_index: u32,
    /// Font metrics
    metrics: FontMetrics,
    /// Font family name
    family_name: String,
}

impl FontFace {
    /// Load a font from raw TTF/OTF data (uses face index 0)
    pub fn from_data(data: Vec<u8>) -> Result<Self> {
        Self::from_data_with_index(data, 0)
    }

    /// Load a font from raw TTF/OTF data with a specific face index
    pub fn from_data_with_index(data: Vec<u8>, face_index: u32) -> Result<Self> {
        let data = Arc::new(data);

        let face = ttf_parser::Face::parse(&data, face_index)
            .map_err(|e| TextError::FontParseError(format!("{:?}", e)))?;

        let metrics = FontMetrics {
            units_per_em: face.units_per_em(),
            ascender: face.ascender(),
            descender: face.descender(),
            line_gap: face.line_gap(),
        };

        let family_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::FAMILY)
            .and_then(|n| n.to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        Ok(Self {
            data,
            face_index,
            metrics,
            family_name,
        })
    }

    /// Load a font from a file path
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            TextError::FontLoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let face = Self::from_data(data)?;
        tracing::debug!("Loaded font '{}' from {}", face.family_name, path.display());
        Ok(face)
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Raw font data for rasterization
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn face_index(&self) -> u32 {
        self.face_index
    }

    /// Glyph ID for a character; `None` when the font maps it to `.notdef`
    pub fn glyph_id(&self, c: char) -> Option<u16> {
        ttf_parser::Face::parse(&self.data, self.face_index)
            .ok()
            .and_then(|face| face.glyph_index(c))
            .map(|id| id.0)
            .filter(|&id| id != 0)
    }
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family_name", &self.family_name)
            .field("face_index", &self.face_index)
            .field("metrics", &self.metrics)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_font_data() {
        assert!(matches!(
            FontFace::from_data(vec![0u8; 16]),
            Err(TextError::FontParseError(_))
        ));
    }

    #[test]
    fn test_missing_font_file() {
        assert!(matches!(
            FontFace::from_file("/no/such/font.ttf"),
            Err(TextError::FontLoadError(_))
        ));
    }

    #[test]
    fn test_scale_for_pixel_height() {
        let metrics = FontMetrics {
            units_per_em: 1000,
            ascender: 800,
            descender: -200,
            line_gap: 100,
        };
        assert!((metrics.scale_for_pixel_height(32.0) - 0.032).abs() < 1e-6);
        assert_eq!(metrics.line_height(), 1100.0);
    }
}
