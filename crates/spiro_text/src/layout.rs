//! Text layout over a baked font
//!
//! Layout is a single left-to-right pass: no shaping, no kerning, no
//! wrapping. `'\n'` moves to the next line and returns to the starting x.

use spiro_core::{Point, Rect};

use crate::baked::BakedFont;

/// Horizontal alignment relative to the anchor x
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical alignment relative to the anchor y
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextBaseline {
    /// Anchor at the top of the first line
    #[default]
    Top,
    /// Anchor at the vertical middle of the text block
    Middle,
    /// Anchor at the bottom of the text block
    Bottom,
    /// Anchor on the first line's baseline
    Alphabetic,
}

/// One glyph quad ready for submission
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphQuad {
    /// Destination rectangle in local space
    pub rect: Rect,
    /// Atlas UV bounds `[u_min, v_min, u_max, v_max]`
    pub uv: [f32; 4],
}

/// Result of laying out a string
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextLayout {
    /// Visible glyph quads in string order
    pub quads: Vec<GlyphQuad>,
    /// Block bounds: widest line by total line height, anchored at the origin
    pub bounds: Rect,
}

/// Lay out `text` with its top-left at `origin`, at `font_size` pixels
///
/// The first baseline sits `ascent` below `origin.y`. Characters the font
/// did not bake are skipped without advancing.
pub fn layout_text(font: &BakedFont, text: &str, origin: Point, font_size: f32) -> TextLayout {
    let scale = font.scale_for(font_size);
    let line_height = font.line_height() * scale;

    let mut quads = Vec::with_capacity(text.len());
    let mut x = origin.x;
    let mut baseline = origin.y + font.ascent() * scale;
    let mut lines = 1usize;
    let mut widest = 0.0f32;

    for c in text.chars() {
        if c == '\n' {
            widest = widest.max(x - origin.x);
            baseline += line_height;
            x = origin.x;
            lines += 1;
            continue;
        }

        let Some(glyph) = font.glyph(c) else {
            tracing::trace!("Skipping unsupported character {:?}", c);
            continue;
        };

        if glyph.has_bitmap() {
            quads.push(GlyphQuad {
                rect: Rect::new(
                    x + glyph.bearing_x * scale,
                    baseline - glyph.bearing_y * scale,
                    glyph.width * scale,
                    glyph.height * scale,
                ),
                uv: glyph.uv,
            });
        }
        x += glyph.advance * scale;
    }
    widest = widest.max(x - origin.x);

    TextLayout {
        quads,
        bounds: Rect::new(origin.x, origin.y, widest, lines as f32 * line_height),
    }
}

/// Size of `text` at `font_size`, positioned at the origin
pub fn measure_text(font: &BakedFont, text: &str, font_size: f32) -> Rect {
    layout_text(font, text, Point::ZERO, font_size).bounds
}

/// Top-left origin that places a block with `bounds` at `anchor`
pub fn aligned_origin(
    font: &BakedFont,
    anchor: Point,
    bounds: Rect,
    font_size: f32,
    align: TextAlign,
    baseline: TextBaseline,
) -> Point {
    let x = match align {
        TextAlign::Left => anchor.x,
        TextAlign::Center => anchor.x - bounds.width() * 0.5,
        TextAlign::Right => anchor.x - bounds.width(),
    };
    let y = match baseline {
        TextBaseline::Top => anchor.y,
        TextBaseline::Middle => anchor.y - bounds.height() * 0.5,
        TextBaseline::Bottom => anchor.y - bounds.height(),
        TextBaseline::Alphabetic => anchor.y - font.ascent() * font.scale_for(font_size),
    };
    Point::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::GlyphAtlas;
    use crate::baked::BakedGlyph;

    /// 10px font: ascent 8, descent -2, no gap; 'A' is 6x8 advancing 7,
    /// space advances 4 with no bitmap
    fn test_font() -> BakedFont {
        let mut glyphs = vec![None; 95];
        glyphs[0] = Some(BakedGlyph {
            uv: [0.0; 4],
            bearing_x: 0.0,
            bearing_y: 0.0,
            width: 0.0,
            height: 0.0,
            advance: 4.0,
        });
        glyphs['A' as usize - 32] = Some(BakedGlyph {
            uv: [0.0, 0.0, 0.5, 1.0],
            bearing_x: 1.0,
            bearing_y: 8.0,
            width: 6.0,
            height: 8.0,
            advance: 7.0,
        });
        BakedFont::from_parts(GlyphAtlas::new(2, 2, 0), glyphs, 10.0, 8.0, -2.0, 0.0)
    }

    #[test]
    fn test_single_glyph_placement() {
        let font = test_font();
        let layout = layout_text(&font, "A", Point::new(100.0, 50.0), 10.0);
        assert_eq!(layout.quads.len(), 1);
        // Baseline at 50 + 8, glyph top 8 above it
        assert_eq!(layout.quads[0].rect, Rect::new(101.0, 50.0, 6.0, 8.0));
        assert_eq!(layout.quads[0].uv, [0.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_advance_and_space() {
        let font = test_font();
        let layout = layout_text(&font, "A A", Point::ZERO, 10.0);
        assert_eq!(layout.quads.len(), 2);
        assert_eq!(layout.quads[1].rect.x(), 7.0 + 4.0 + 1.0);
        assert_eq!(layout.bounds.width(), 18.0);
    }

    #[test]
    fn test_scaled_layout() {
        let font = test_font();
        let layout = layout_text(&font, "A", Point::ZERO, 20.0);
        assert_eq!(layout.quads[0].rect, Rect::new(2.0, 0.0, 12.0, 16.0));
        assert_eq!(layout.bounds.height(), 20.0);
    }

    #[test]
    fn test_unsupported_characters_skipped() {
        let font = test_font();
        let layout = layout_text(&font, "AéB\u{1F600}A", Point::ZERO, 10.0);
        assert_eq!(layout.quads.len(), 2);
        assert_eq!(layout.quads[1].rect.x(), 8.0);
    }

    #[test]
    fn test_newline_returns_to_origin_x() {
        let font = test_font();
        let layout = layout_text(&font, "AA\nA", Point::new(5.0, 0.0), 10.0);
        assert_eq!(layout.quads.len(), 3);
        assert_eq!(layout.quads[2].rect.x(), 6.0);
        assert_eq!(layout.quads[2].rect.y(), 10.0);
        assert_eq!(layout.bounds, Rect::new(5.0, 0.0, 14.0, 20.0));
    }

    #[test]
    fn test_measure_empty() {
        let font = test_font();
        assert_eq!(measure_text(&font, "", 10.0), Rect::new(0.0, 0.0, 0.0, 10.0));
    }

    #[test]
    fn test_aligned_origin() {
        let font = test_font();
        let bounds = measure_text(&font, "AA", 10.0);
        let anchor = Point::new(100.0, 100.0);
        let centered = aligned_origin(
            &font,
            anchor,
            bounds,
            10.0,
            TextAlign::Center,
            TextBaseline::Middle,
        );
        assert_eq!(centered, Point::new(93.0, 95.0));
        let right = aligned_origin(
            &font,
            anchor,
            bounds,
            10.0,
            TextAlign::Right,
            TextBaseline::Alphabetic,
        );
        assert_eq!(right, Point::new(86.0, 92.0));
    }
}
