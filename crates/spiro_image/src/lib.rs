//! Spiro Image
//!
//! Decodes image files into straight-alpha RGBA8 [`ImageData`] ready for
//! texture upload, and writes rendered frames back out as PNG.

mod error;
mod loader;

pub use error::{ImageError, Result};
pub use loader::ImageData;
