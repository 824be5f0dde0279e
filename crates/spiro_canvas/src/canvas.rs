//! The drawing canvas
//!
//! A [`Canvas`] owns a batch [`Renderer`] and the pens, paths, images and
//! fonts created through it. Resources are addressed by typed keys; a key
//! that no longer resolves (destroyed, or never set) makes the draw that
//! uses it a silent no-op.

use std::path::Path as FsPath;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use slotmap::SlotMap;
use spiro_core::{Color, FontId, ImageId, Path, PathId, Pen, PenId, Point, Rect, Size, TextureId};
use spiro_gpu::{FrameStats, GpuBackend, Renderer, WgpuBackend};
use spiro_image::ImageData;
use spiro_text::{
    aligned_origin, layout_text, measure_text, BakeConfig, BakedFont, FontFace, TextAlign,
    TextBaseline,
};

use crate::config::{CanvasConfig, LogLevel};
use crate::error::{CanvasError, Result};

/// An image uploaded to the backend
struct ImageEntry {
    texture: TextureId,
    width: u32,
    height: u32,
}

/// A baked font and its atlas texture
struct FontEntry {
    font: BakedFont,
    atlas: TextureId,
}

/// Immediate-mode 2D canvas over a [`GpuBackend`]
pub struct Canvas<B: GpuBackend = WgpuBackend> {
    renderer: Renderer<B>,
    config: CanvasConfig,
    pens: SlotMap<PenId, Pen>,
    paths: SlotMap<PathId, Path>,
    images: SlotMap<ImageId, ImageEntry>,
    fonts: SlotMap<FontId, FontEntry>,
    /// Cleared when the owning `Spiro` terminates (None for headless canvases)
    alive: Option<Arc<AtomicBool>>,
    log_level: LogLevel,
}

impl<B: GpuBackend> Canvas<B> {
    /// Create a canvas over `backend` outside the `Spiro` lifecycle
    pub fn headless(backend: B, config: CanvasConfig) -> Self {
        Self::new(backend, config, None)
    }

    pub(crate) fn with_liveness(backend: B, config: CanvasConfig, alive: Arc<AtomicBool>) -> Self {
        Self::new(backend, config, Some(alive))
    }

    fn new(backend: B, config: CanvasConfig, alive: Option<Arc<AtomicBool>>) -> Self {
        Self {
            renderer: Renderer::new(backend),
            config,
            pens: SlotMap::with_key(),
            paths: SlotMap::with_key(),
            images: SlotMap::with_key(),
            fonts: SlotMap::with_key(),
            alive,
            log_level: LogLevel::default(),
        }
    }

    fn is_alive(&self) -> bool {
        self.alive
            .as_ref()
            .map_or(true, |alive| alive.load(Ordering::Acquire))
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(CanvasError::Terminated)
        }
    }

    /// Report a skipped draw at the configured level
    fn skipped(&self, what: &str) {
        match self.log_level {
            LogLevel::Trace => tracing::trace!("Skipping {}", what),
            LogLevel::Debug => tracing::debug!("Skipping {}", what),
            LogLevel::Info => tracing::info!("Skipping {}", what),
            LogLevel::Warn => tracing::warn!("Skipping {}", what),
            LogLevel::Error => tracing::error!("Skipping {}", what),
            LogLevel::Off => {}
        }
    }

    // ------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------

    /// Start a frame at the canvas size
    pub fn begin_frame(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.renderer
            .begin_frame(self.config.width, self.config.height)?;
        if let Some(background) = self.config.background {
            self.renderer.clear(background);
        }
        Ok(())
    }

    /// Flush pending drawing and present the frame
    pub fn end_frame(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.renderer.end_frame()?;
        Ok(())
    }

    /// Clear the whole target, after flushing what was drawn so far
    pub fn clear(&mut self, color: Color) {
        if !self.is_alive() {
            return;
        }
        self.renderer.clear(color);
    }

    /// Submit pending geometry now
    pub fn flush(&mut self) {
        if !self.is_alive() {
            return;
        }
        self.renderer.flush();
    }

    pub fn size(&self) -> Size {
        Size::new(self.config.width as f32, self.config.height as f32)
    }

    /// Change the target size; takes effect from the next frame
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.renderer.resize(width, height);
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Counters for the current (or just finished) frame
    pub fn frame_stats(&self) -> FrameStats {
        self.renderer.stats()
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = level;
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    pub fn save(&mut self) {
        self.renderer.state_mut().save();
    }

    /// Restore the last saved state; with nothing saved this does nothing
    pub fn restore(&mut self) {
        self.renderer.state_mut().restore();
    }

    pub fn reset_transform(&mut self) {
        self.renderer.state_mut().reset_transform();
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.renderer.state_mut().translate(x, y);
    }

    pub fn rotate(&mut self, angle_radians: f32) {
        self.renderer.state_mut().rotate(angle_radians);
    }

    pub fn scale(&mut self, x: f32, y: f32) {
        self.renderer.state_mut().scale(x, y);
    }

    pub fn set_color(&mut self, color: Color) {
        self.renderer.state_mut().set_color(color);
    }

    pub fn set_pen(&mut self, pen: Option<PenId>) {
        self.renderer.state_mut().set_pen(pen);
    }

    pub fn set_font(&mut self, font: Option<FontId>, size: f32) {
        self.renderer.state_mut().set_font(font, size);
    }

    // ------------------------------------------------------------------
    // Pens and paths
    // ------------------------------------------------------------------

    pub fn create_pen(&mut self, pen: Pen) -> PenId {
        self.pens.insert(pen)
    }

    pub fn destroy_pen(&mut self, pen: PenId) {
        self.pens.remove(pen);
    }

    pub fn pen(&self, pen: PenId) -> Option<&Pen> {
        self.pens.get(pen)
    }

    pub fn create_path(&mut self) -> PathId {
        self.paths.insert(Path::new())
    }

    pub fn destroy_path(&mut self, path: PathId) {
        self.paths.remove(path);
    }

    pub fn path(&self, path: PathId) -> Option<&Path> {
        self.paths.get(path)
    }

    pub fn path_move_to(&mut self, path: PathId, x: f32, y: f32) {
        if let Some(p) = self.paths.get_mut(path) {
            p.move_to(x, y);
        }
    }

    pub fn path_line_to(&mut self, path: PathId, x: f32, y: f32) {
        if let Some(p) = self.paths.get_mut(path) {
            p.line_to(x, y);
        }
    }

    /// Accepted but not flattened: arcs are not drawn
    pub fn path_arc_to(&mut self, _path: PathId, _x1: f32, _y1: f32, _x2: f32, _y2: f32, _r: f32) {
        self.skipped("arc segment");
    }

    /// Accepted but not flattened: curves are not drawn
    #[allow(clippy::too_many_arguments)]
    pub fn path_cubic_bezier_to(
        &mut self,
        _path: PathId,
        _c1x: f32,
        _c1y: f32,
        _c2x: f32,
        _c2y: f32,
        _x: f32,
        _y: f32,
    ) {
        self.skipped("cubic bezier segment");
    }

    pub fn path_close(&mut self, path: PathId) {
        if let Some(p) = self.paths.get_mut(path) {
            p.close();
        }
    }

    /// Stroke `path` with the current pen and color
    pub fn stroke_path(&mut self, path: PathId) {
        if !self.is_alive() {
            return;
        }
        let Some(pen) = self.current_pen() else {
            self.skipped("stroke without a pen");
            return;
        };
        let Some(p) = self.paths.get(path) else {
            self.skipped("stroke of a destroyed path");
            return;
        };
        self.renderer.stroke_polyline(p.points(), &pen);
    }

    /// Polygon filling is not supported
    pub fn fill_path(&mut self, _path: PathId) {
        self.skipped("path fill");
    }

    fn current_pen(&self) -> Option<Pen> {
        self.renderer
            .state()
            .top()
            .pen
            .and_then(|id| self.pens.get(id))
            .copied()
    }

    // ------------------------------------------------------------------
    // Shapes
    // ------------------------------------------------------------------

    /// Stroke one segment with the current pen
    pub fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        if !self.is_alive() {
            return;
        }
        let Some(pen) = self.current_pen() else {
            self.skipped("line without a pen");
            return;
        };
        self.renderer
            .stroke_polyline(&[Point::new(x1, y1), Point::new(x2, y2)], &pen);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        if !self.is_alive() {
            return;
        }
        self.renderer.fill_rect(Rect::new(x, y, width, height));
    }

    /// Same as [`fill_rect`](Self::fill_rect); outlined rects are not drawn
    pub fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.fill_rect(x, y, width, height);
    }

    /// Circles are not tessellated
    pub fn draw_circle(&mut self, _cx: f32, _cy: f32, _radius: f32) {
        self.skipped("circle");
    }

    /// Ellipses are not tessellated
    pub fn draw_ellipse(&mut self, _cx: f32, _cy: f32, _rx: f32, _ry: f32) {
        self.skipped("ellipse");
    }

    /// Circles are not tessellated
    pub fn fill_circle(&mut self, _cx: f32, _cy: f32, _radius: f32) {
        self.skipped("filled circle");
    }

    // ------------------------------------------------------------------
    // Images
    // ------------------------------------------------------------------

    /// Decode an image file and upload it
    pub fn load_image(&mut self, path: impl AsRef<FsPath>) -> Result<ImageId> {
        let data = ImageData::load(path)?;
        self.create_image(&data)
    }

    /// Upload decoded RGBA pixels
    pub fn create_image(&mut self, data: &ImageData) -> Result<ImageId> {
        let (width, height) = data.dimensions();
        let texture = self
            .renderer
            .create_texture(width, height, data.pixels())?;
        Ok(self.images.insert(ImageEntry {
            texture,
            width,
            height,
        }))
    }

    /// Release an image and its texture
    pub fn destroy_image(&mut self, image: ImageId) {
        if let Some(entry) = self.images.remove(image) {
            self.renderer.destroy_texture(entry.texture);
        }
    }

    /// Pixel size of an image
    pub fn image_size(&self, image: ImageId) -> Option<(u32, u32)> {
        self.images.get(image).map(|e| (e.width, e.height))
    }

    /// Draw an image at its native size with its top-left at `(x, y)`
    pub fn draw_image(&mut self, image: ImageId, x: f32, y: f32) {
        if !self.is_alive() {
            return;
        }
        let Some(entry) = self.images.get(image) else {
            self.skipped("draw of a destroyed image");
            return;
        };
        let (texture, size) = (entry.texture, (entry.width, entry.height));
        self.renderer.draw_image(texture, size, Point::new(x, y));
    }

    /// Draw the `src` pixel rectangle of an image into `dest`
    pub fn draw_image_rect(&mut self, image: ImageId, src: Rect, dest: Rect) {
        if !self.is_alive() {
            return;
        }
        let Some(entry) = self.images.get(image) else {
            self.skipped("draw of a destroyed image");
            return;
        };
        let (texture, size) = (entry.texture, (entry.width, entry.height));
        self.renderer.draw_image_rect(texture, size, src, dest);
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    /// Load a font file and bake it with default settings
    pub fn load_font(&mut self, path: impl AsRef<FsPath>) -> Result<FontId> {
        self.load_font_with(path, &BakeConfig::default())
    }

    pub fn load_font_with(&mut self, path: impl AsRef<FsPath>, config: &BakeConfig) -> Result<FontId> {
        let face = FontFace::from_file(path)?;
        self.create_font(&face, config)
    }

    /// Bake `face` and upload its atlas
    pub fn create_font(&mut self, face: &FontFace, config: &BakeConfig) -> Result<FontId> {
        let font = BakedFont::bake(face, config)?;
        self.add_baked_font(font)
    }

    /// Upload the atlas of an already baked font
    pub fn add_baked_font(&mut self, font: BakedFont) -> Result<FontId> {
        let (width, height) = font.atlas().dimensions();
        let atlas = self
            .renderer
            .create_texture(width, height, &font.atlas().to_rgba())?;
        Ok(self.fonts.insert(FontEntry { font, atlas }))
    }

    /// Release a font and its atlas texture
    pub fn destroy_font(&mut self, font: FontId) {
        if let Some(entry) = self.fonts.remove(font) {
            self.renderer.destroy_texture(entry.atlas);
        }
    }

    pub fn font(&self, font: FontId) -> Option<&BakedFont> {
        self.fonts.get(font).map(|e| &e.font)
    }

    fn current_font(&self) -> Option<(&FontEntry, f32)> {
        let state = self.renderer.state().top();
        let entry = self.fonts.get(state.font?)?;
        Some((entry, state.font_size))
    }

    /// Draw `text` with its top-left at `(x, y)` in the current font
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32) {
        self.draw_text_at(text, Point::new(x, y));
    }

    /// Draw `text` positioned relative to `(x, y)` by `align` and `baseline`
    pub fn draw_text_aligned(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        align: TextAlign,
        baseline: TextBaseline,
    ) {
        let Some((entry, size)) = self.current_font() else {
            self.skipped("text without a font");
            return;
        };
        let bounds = measure_text(&entry.font, text, size);
        let origin = aligned_origin(&entry.font, Point::new(x, y), bounds, size, align, baseline);
        self.draw_text_at(text, origin);
    }

    fn draw_text_at(&mut self, text: &str, origin: Point) {
        if !self.is_alive() {
            return;
        }
        let Some((entry, size)) = self.current_font() else {
            self.skipped("text without a font");
            return;
        };
        let layout = layout_text(&entry.font, text, origin, size);
        let atlas = entry.atlas;
        self.renderer.draw_glyphs(atlas, &layout);
    }

    /// Bounds of `text` in the current font, at the origin
    ///
    /// Zero-sized when no font is set.
    pub fn measure_text(&self, text: &str) -> Rect {
        match self.current_font() {
            Some((entry, size)) => measure_text(&entry.font, text, size),
            None => Rect::ZERO,
        }
    }

    // ------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------

    pub fn renderer(&self) -> &Renderer<B> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer<B> {
        &mut self.renderer
    }

    pub fn backend(&self) -> &B {
        self.renderer.backend()
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.renderer.backend_mut()
    }
}

impl Canvas<WgpuBackend> {
    /// Read the last rendered frame of an offscreen canvas
    pub fn snapshot(&self) -> Result<ImageData> {
        let (width, height) = self.renderer.backend().size();
        let pixels = self.renderer.backend().read_pixels()?;
        Ok(ImageData::from_rgba(pixels, width, height)?)
    }
}
