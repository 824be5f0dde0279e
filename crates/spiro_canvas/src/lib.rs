//! Spiro Canvas
//!
//! Immediate-mode 2D drawing: strokes, rectangles, images and text are
//! batched into as few GPU draw calls as possible.
//!
//! # Example (Offscreen)
//!
//! ```ignore
//! use spiro_canvas::prelude::*;
//!
//! let spiro = Spiro::initialize()?;
//! let mut canvas = spiro.create_offscreen_canvas(CanvasConfig::default().size(400, 300))?;
//!
//! let pen = canvas.create_pen(Pen::new(2.0));
//! canvas.begin_frame()?;
//! canvas.clear(Color::BLACK);
//! canvas.set_pen(Some(pen));
//! canvas.set_color(Color::from_hex("#ff8800")?);
//! canvas.draw_line(10.0, 10.0, 390.0, 290.0);
//! canvas.end_frame()?;
//!
//! canvas.snapshot()?.save_png("line.png")?;
//! ```
//!
//! # Example (Headless)
//!
//! ```ignore
//! use spiro_canvas::prelude::*;
//!
//! let mut canvas = Canvas::headless(RecordingBackend::new(), CanvasConfig::default());
//! canvas.begin_frame()?;
//! canvas.fill_rect(0.0, 0.0, 10.0, 10.0);
//! canvas.end_frame()?;
//! assert_eq!(canvas.backend().draws.len(), 1);
//! ```

mod canvas;
mod config;
mod error;
mod lifecycle;

#[cfg(test)]
mod tests;

pub use canvas::Canvas;
pub use config::{CanvasConfig, LogLevel};
pub use error::{CanvasError, Result};
pub use lifecycle::Spiro;

// Re-export the drawing vocabulary
pub use spiro_core::{Color, FontId, ImageId, LineCap, LineJoin, PathId, Pen, PenId, Point, Rect, Size};
pub use spiro_gpu::{FrameStats, GpuBackend, RecordingBackend, RendererConfig, WgpuBackend};
pub use spiro_image::ImageData;
pub use spiro_text::{BakeConfig, BakedFont, FontFace, TextAlign, TextBaseline};

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::canvas::Canvas;
    pub use crate::config::{CanvasConfig, LogLevel};
    pub use crate::error::{CanvasError, Result};
    pub use crate::lifecycle::Spiro;

    pub use spiro_core::{Color, LineCap, LineJoin, Pen, Point, Rect, Size};
    pub use spiro_gpu::{GpuBackend, RecordingBackend};
    pub use spiro_text::{TextAlign, TextBaseline};
}
