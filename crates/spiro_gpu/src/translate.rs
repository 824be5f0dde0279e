//! Shape-to-quad translation
//!
//! Each drawing primitive becomes one or more quads appended to the
//! [`Renderer`] with the current state's color. Nothing here talks to the
//! backend directly.

use spiro_core::{Color, Pen, Point, Rect, TextureId};
use spiro_text::TextLayout;

use crate::backend::GpuBackend;
use crate::renderer::Renderer;

impl<B: GpuBackend> Renderer<B> {
    /// Stroke consecutive point pairs as independent quads
    ///
    /// Each segment is widened by half the pen width on both sides. No
    /// joins or caps are produced. A zero-length segment yields a
    /// zero-width quad.
    pub fn stroke_polyline(&mut self, points: &[Point], pen: &Pen) {
        if points.len() < 2 {
            return;
        }
        let color = self.state().top().color;
        let half_width = pen.half_width();

        for segment in points.windows(2) {
            let (p1, p2) = (segment[0], segment[1]);
            let normal = (p2 - p1).normalize().perp() * half_width;
            self.append_quad(
                [p1 - normal, p2 - normal, p2 + normal, p1 + normal],
                color,
                None,
                [0.0; 4],
            );
        }
    }

    /// Fill an axis-aligned rectangle with the current color
    pub fn fill_rect(&mut self, rect: Rect) {
        let color = self.state().top().color;
        self.append_quad(rect.corners(), color, None, [0.0; 4]);
    }

    /// Draw a whole texture of `size` pixels with its top-left at `position`
    pub fn draw_image(&mut self, texture: TextureId, size: (u32, u32), position: Point) {
        let (width, height) = size;
        let src = Rect::new(0.0, 0.0, width as f32, height as f32);
        let dest = Rect::new(position.x, position.y, width as f32, height as f32);
        self.draw_image_rect(texture, size, src, dest);
    }

    /// Draw the `src` pixel rectangle of a texture scaled into `dest`
    ///
    /// Images are not tinted by the current color.
    pub fn draw_image_rect(&mut self, texture: TextureId, size: (u32, u32), src: Rect, dest: Rect) {
        let (width, height) = (size.0 as f32, size.1 as f32);
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let uv = [
            src.x() / width,
            src.y() / height,
            src.max_x() / width,
            src.max_y() / height,
        ];
        self.append_textured_quad(dest.corners(), Color::WHITE, texture, uv);
    }

    /// Draw laid-out glyphs sampling the font atlas `atlas`
    pub fn draw_glyphs(&mut self, atlas: TextureId, layout: &TextLayout) {
        let color = self.state().top().color;
        for glyph in &layout.quads {
            self.append_textured_quad(glyph.rect.corners(), color, atlas, glyph.uv);
        }
    }
}
