//! Glyph rasterization using swash
//!
//! Converts font glyph outlines to 8-bit coverage bitmaps for the atlas.

use swash::scale::{Render, ScaleContext, Source};
use swash::zeno::Format;

use crate::font::FontFace;
use crate::{Result, TextError};

/// Rasterized glyph bitmap with metrics in pixels
#[derive(Debug, Clone)]
pub struct RasterizedGlyph {
    /// Coverage bitmap (one byte per pixel)
    pub bitmap: Vec<u8>,
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
    /// Horizontal bearing (offset from origin to left edge)
    pub bearing_x: i32,
    /// Vertical bearing (offset from baseline up to top edge)
    pub bearing_y: i32,
    /// Horizontal advance to next glyph position
    pub advance: f32,
}

/// Glyph rasterizer using swash
pub struct GlyphRasterizer {
    /// Swash scale context (caches scaling state)
    scale_context: ScaleContext,
}

impl GlyphRasterizer {
    pub fn new() -> Self {
        Self {
            scale_context: ScaleContext::new(),
        }
    }

    /// Rasterize a glyph with an em size of `em_size` pixels
    pub fn rasterize(
        &mut self,
        font: &FontFace,
        glyph_id: u16,
        em_size: f32,
    ) -> Result<RasterizedGlyph> {
        let swash_font = swash::FontRef::from_index(font.data(), font.face_index() as usize)
            .ok_or(TextError::InvalidFontData)?;

        let mut scaler = self
            .scale_context
            .builder(swash_font)
            .size(em_size)
            .build();

        let units_per_em = swash_font.metrics(&[]).units_per_em as f32;
        let advance =
            swash_font.glyph_metrics(&[]).advance_width(glyph_id) * em_size / units_per_em;

        let image = Render::new(&[Source::Outline])
            .format(Format::Alpha)
            .render(&mut scaler, glyph_id);

        Ok(match image {
            Some(img) => RasterizedGlyph {
                bitmap: img.data,
                width: img.placement.width,
                height: img.placement.height,
                bearing_x: img.placement.left,
                bearing_y: img.placement.top,
                advance,
            },
            // Empty glyph (like space) - no bitmap but has advance
            None => RasterizedGlyph {
                bitmap: Vec::new(),
                width: 0,
                height: 0,
                bearing_x: 0,
                bearing_y: 0,
                advance,
            },
        })
    }
}

impl Default for GlyphRasterizer {
    fn default() -> Self {
        Self::new()
    }
}
