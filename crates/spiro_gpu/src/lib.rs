//! Spiro GPU Renderer
//!
//! Batched 2D rendering: every draw call is translated into quads that
//! accumulate in one vertex buffer, sharing up to [`MAX_TEXTURES`] texture
//! bindings, and are submitted in a single draw when the batch is flushed.
//!
//! - [`Renderer`] owns the batch, the texture slot table, and the state stack
//! - [`translate`] turns strokes, rects, images, and glyph runs into quads
//! - [`GpuBackend`] is the seam to the GPU; [`WgpuBackend`] renders with
//!   wgpu and [`RecordingBackend`] records submissions for headless use

pub mod backend;
pub mod batch;
pub mod renderer;
pub mod shaders;
pub mod slots;
pub mod translate;
pub mod vertex;
pub mod wgpu_backend;

pub use backend::{DrawCall, FrameParams, GpuBackend, RecordedTexture, RecordingBackend};
pub use batch::VertexBatch;
pub use renderer::{FrameStats, Renderer};
pub use slots::TextureSlotTable;
pub use vertex::{Vertex, MAX_QUADS, MAX_TEXTURES, MAX_VERTICES, UNTEXTURED};
pub use wgpu_backend::{RendererConfig, WgpuBackend};

use thiserror::Error;

/// GPU layer errors
#[derive(Error, Debug)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    AdapterNotFound,

    #[error("Failed to request GPU device: {0}")]
    DeviceError(#[from] wgpu::RequestDeviceError),

    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("Failed to acquire surface texture: {0}")]
    AcquireFrame(#[from] wgpu::SurfaceError),

    #[error("Texture data is {actual} bytes, expected {expected}")]
    InvalidTextureData { expected: usize, actual: usize },

    #[error("Invalid texture size {width}x{height}")]
    InvalidTextureSize { width: u32, height: u32 },

    #[error("Pixel readback failed: {0}")]
    Readback(String),

    #[error("Operation requires an offscreen target")]
    NotOffscreen,
}

pub type Result<T> = std::result::Result<T, GpuError>;
