//! Text rendering support for the Spiro renderer
//!
//! This crate provides:
//! - Font loading and parsing (TTF/OTF via ttf-parser)
//! - Glyph rasterization (swash)
//! - A baked ASCII glyph atlas with single-channel coverage
//! - Simple left-to-right text layout and measurement

pub mod atlas;
pub mod baked;
pub mod font;
pub mod layout;
pub mod rasterizer;

pub use atlas::{AtlasRegion, GlyphAtlas};
pub use baked::{BakeConfig, BakedFont, BakedGlyph, FIRST_BAKED_CHAR, LAST_BAKED_CHAR};
pub use font::{FontFace, FontMetrics};
pub use layout::{
    aligned_origin, layout_text, measure_text, GlyphQuad, TextAlign, TextBaseline, TextLayout,
};
pub use rasterizer::{GlyphRasterizer, RasterizedGlyph};

use thiserror::Error;

/// Text rendering errors
#[derive(Error, Debug)]
pub enum TextError {
    #[error("Failed to load font: {0}")]
    FontLoadError(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Atlas is full, cannot allocate glyph")]
    AtlasFull,

    #[error("Invalid font data")]
    InvalidFontData,

    #[error("Invalid bake configuration: {0}")]
    InvalidBakeConfig(String),
}

pub type Result<T> = std::result::Result<T, TextError>;
