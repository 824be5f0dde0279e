//! Spiro Core
//!
//! Value types shared by every layer of the Spiro renderer:
//!
//! - **Geometry**: [`Point`], [`Vec2`], [`Size`], [`Rect`]
//! - **Color**: linear RGBA [`Color`] with hex parsing
//! - **Transforms**: column-major [`Mat4`] used by the render state
//! - **Pens and paths**: [`Pen`] stroke styles and [`Path`] polylines
//! - **Render state**: [`RenderState`] snapshots and the save/restore [`StateStack`]
//! - **Handles**: typed keys ([`PenId`], [`PathId`], [`ImageId`], [`FontId`], [`TextureId`])
//!
//! # Example
//!
//! ```ignore
//! use spiro_core::{Color, StateStack};
//!
//! let mut stack = StateStack::new();
//! stack.save();
//! stack.translate(10.0, 0.0);
//! stack.set_color(Color::RED);
//! stack.restore();
//! assert_eq!(stack.top().color, Color::WHITE);
//! ```

pub mod color;
pub mod geometry;
pub mod handles;
pub mod path;
pub mod pen;
pub mod state;
pub mod transform;

pub use color::Color;
pub use geometry::{Point, Rect, Size, Vec2};
pub use handles::{FontId, ImageId, PathId, PenId, TextureId};
pub use path::Path;
pub use pen::{LineCap, LineJoin, Pen};
pub use state::{RenderState, StateStack, DEFAULT_FONT_SIZE};
pub use transform::Mat4;

use thiserror::Error;

/// Core value errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid hex color '{0}': expected #RRGGBB or #RRGGBBAA")]
    InvalidHexColor(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
