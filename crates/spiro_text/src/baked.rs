//! Baked ASCII fonts
//!
//! A [`BakedFont`] holds printable ASCII (32..=126) rasterized once at a fixed
//! pixel height into a [`GlyphAtlas`]. Drawing at other sizes scales the baked
//! quads; code points outside the baked range are not drawable.

use crate::atlas::GlyphAtlas;
use crate::font::FontFace;
use crate::rasterizer::GlyphRasterizer;
use crate::{Result, TextError};

/// First baked code point (space)
pub const FIRST_BAKED_CHAR: char = ' ';
/// Last baked code point (tilde)
pub const LAST_BAKED_CHAR: char = '~';

const BAKED_COUNT: usize = LAST_BAKED_CHAR as usize - FIRST_BAKED_CHAR as usize + 1;

/// Font baking options
#[derive(Clone, Debug)]
pub struct BakeConfig {
    /// Ascender-to-descender height glyphs are rasterized at
    pub pixel_height: f32,
    /// Atlas width in pixels
    pub atlas_width: u32,
    /// Atlas height in pixels
    pub atlas_height: u32,
    /// Empty pixels kept between glyphs
    pub padding: u32,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            pixel_height: 32.0,
            atlas_width: 512,
            atlas_height: 512,
            padding: 1,
        }
    }
}

impl BakeConfig {
    pub fn with_pixel_height(mut self, pixel_height: f32) -> Self {
        self.pixel_height = pixel_height;
        self
    }

    pub fn with_atlas_size(mut self, width: u32, height: u32) -> Self {
        self.atlas_width = width;
        self.atlas_height = height;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.pixel_height > 0.0) {
            return Err(TextError::InvalidBakeConfig(format!(
                "pixel height must be positive, got {}",
                self.pixel_height
            )));
        }
        if self.atlas_width == 0 || self.atlas_height == 0 {
            return Err(TextError::InvalidBakeConfig(format!(
                "atlas size must be non-zero, got {}x{}",
                self.atlas_width, self.atlas_height
            )));
        }
        Ok(())
    }
}

/// Placement and atlas location of one baked glyph, in pixels at bake size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BakedGlyph {
    /// UV bounds in the atlas `[u_min, v_min, u_max, v_max]`
    pub uv: [f32; 4],
    /// Offset from pen position to the bitmap's left edge
    pub bearing_x: f32,
    /// Offset from baseline up to the bitmap's top edge
    pub bearing_y: f32,
    /// Bitmap width
    pub width: f32,
    /// Bitmap height
    pub height: f32,
    /// Horizontal advance
    pub advance: f32,
}

impl BakedGlyph {
    /// Whether the glyph has a visible bitmap (space does not)
    pub fn has_bitmap(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// A font rasterized into a coverage atlas
#[derive(Debug, Clone)]
pub struct BakedFont {
    atlas: GlyphAtlas,
    glyphs: Vec<Option<BakedGlyph>>,
    pixel_height: f32,
    /// Ascender in pixels at bake size
    ascent: f32,
    /// Descender in pixels at bake size (negative)
    descent: f32,
    /// Line gap in pixels at bake size
    line_gap: f32,
}

impl BakedFont {
    /// Rasterize the printable ASCII range of `face` into a new atlas
    pub fn bake(face: &FontFace, config: &BakeConfig) -> Result<Self> {
        config.validate()?;

        let metrics = face.metrics();
        let scale = metrics.scale_for_pixel_height(config.pixel_height);
        let em_size = scale * metrics.units_per_em as f32;

        let mut atlas = GlyphAtlas::new(config.atlas_width, config.atlas_height, config.padding);
        let mut rasterizer = GlyphRasterizer::new();
        let mut glyphs = Vec::with_capacity(BAKED_COUNT);

        for c in FIRST_BAKED_CHAR..=LAST_BAKED_CHAR {
            let Some(glyph_id) = face.glyph_id(c) else {
                tracing::trace!("Font '{}' has no glyph for {:?}", face.family_name(), c);
                glyphs.push(None);
                continue;
            };

            let raster = rasterizer.rasterize(face, glyph_id, em_size)?;
            let (uv, width, height) = if raster.width > 0 && raster.height > 0 {
                let region = atlas.allocate(raster.width, raster.height)?;
                atlas.write(region, &raster.bitmap);
                let (aw, ah) = atlas.dimensions();
                (
                    region.uv_bounds(aw, ah),
                    raster.width as f32,
                    raster.height as f32,
                )
            } else {
                ([0.0; 4], 0.0, 0.0)
            };

            glyphs.push(Some(BakedGlyph {
                uv,
                bearing_x: raster.bearing_x as f32,
                bearing_y: raster.bearing_y as f32,
                width,
                height,
                advance: raster.advance,
            }));
        }

        tracing::debug!(
            "Baked font '{}' at {}px into {}x{} atlas",
            face.family_name(),
            config.pixel_height,
            config.atlas_width,
            config.atlas_height
        );

        Ok(Self {
            atlas,
            glyphs,
            pixel_height: config.pixel_height,
            ascent: metrics.ascender as f32 * scale,
            descent: metrics.descender as f32 * scale,
            line_gap: metrics.line_gap as f32 * scale,
        })
    }

    /// Assemble a baked font from precomputed parts
    ///
    /// `glyphs` is indexed from [`FIRST_BAKED_CHAR`]; missing trailing entries
    /// are treated as absent glyphs.
    pub fn from_parts(
        atlas: GlyphAtlas,
        mut glyphs: Vec<Option<BakedGlyph>>,
        pixel_height: f32,
        ascent: f32,
        descent: f32,
        line_gap: f32,
    ) -> Self {
        glyphs.resize(BAKED_COUNT, None);
        Self {
            atlas,
            glyphs,
            pixel_height,
            ascent,
            descent,
            line_gap,
        }
    }

    /// Baked glyph for `c`, `None` outside 32..=126 or when the font lacks it
    pub fn glyph(&self, c: char) -> Option<&BakedGlyph> {
        if !(FIRST_BAKED_CHAR..=LAST_BAKED_CHAR).contains(&c) {
            return None;
        }
        self.glyphs[c as usize - FIRST_BAKED_CHAR as usize].as_ref()
    }

    pub fn atlas(&self) -> &GlyphAtlas {
        &self.atlas
    }

    /// Pixel height the atlas was baked at
    pub fn pixel_height(&self) -> f32 {
        self.pixel_height
    }

    /// Scale from bake size to `font_size`
    pub fn scale_for(&self, font_size: f32) -> f32 {
        font_size / self.pixel_height
    }

    pub fn ascent(&self) -> f32 {
        self.ascent
    }

    pub fn descent(&self) -> f32 {
        self.descent
    }

    /// Baseline-to-baseline distance at bake size
    pub fn line_height(&self) -> f32 {
        self.ascent - self.descent + self.line_gap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_lookup_range() {
        let glyph = BakedGlyph {
            uv: [0.0, 0.0, 0.5, 0.5],
            bearing_x: 1.0,
            bearing_y: 8.0,
            width: 6.0,
            height: 8.0,
            advance: 7.0,
        };
        let mut glyphs = vec![None; BAKED_COUNT];
        glyphs['A' as usize - 32] = Some(glyph);
        let atlas = GlyphAtlas::new(4, 4, 0);
        let font = BakedFont::from_parts(atlas, glyphs, 16.0, 12.0, -4.0, 2.0);

        assert_eq!(font.glyph('A'), Some(&glyph));
        assert!(font.glyph('B').is_none());
        assert!(font.glyph('\u{1F600}').is_none());
        assert!(font.glyph('\t').is_none());
        assert_eq!(font.line_height(), 18.0);
        assert_eq!(font.scale_for(32.0), 2.0);
    }

    #[test]
    fn test_invalid_bake_config() {
        let config = BakeConfig::default().with_pixel_height(0.0);
        assert!(matches!(
            config.validate(),
            Err(TextError::InvalidBakeConfig(_))
        ));
        let config = BakeConfig::default().with_atlas_size(0, 64);
        assert!(config.validate().is_err());
    }

    /// Bakes a real font when one is installed on the host
    #[test]
    fn test_bake_system_font() {
        const CANDIDATES: &[&str] = &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "C:\\Windows\\Fonts\\arial.ttf",
        ];
        let Some(face) = CANDIDATES.iter().find_map(|p| FontFace::from_file(p).ok()) else {
            return;
        };

        let font = BakedFont::bake(&face, &BakeConfig::default()).unwrap();
        let space = font.glyph(' ').unwrap();
        assert!(!space.has_bitmap());
        assert!(space.advance > 0.0);

        let a = font.glyph('A').unwrap();
        assert!(a.has_bitmap());
        assert!(a.uv[2] > a.uv[0] && a.uv[3] > a.uv[1]);
        assert!(font.ascent() > 0.0 && font.descent() < 0.0);
        assert!(font.atlas().pixels().iter().any(|&c| c > 0));
    }
}
