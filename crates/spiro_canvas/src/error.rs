//! Error types for spiro_canvas

use thiserror::Error;

/// Errors that can occur creating or driving a canvas
#[derive(Error, Debug)]
pub enum CanvasError {
    /// `Spiro::initialize` called while another instance is live
    #[error("Spiro is already initialized")]
    AlreadyInitialized,

    /// The owning `Spiro` instance was terminated
    #[error("Spiro has been terminated")]
    Terminated,

    #[error(transparent)]
    Gpu(#[from] spiro_gpu::GpuError),

    #[error(transparent)]
    Text(#[from] spiro_text::TextError),

    #[error(transparent)]
    Image(#[from] spiro_image::ImageError),

    #[error(transparent)]
    Core(#[from] spiro_core::CoreError),
}

/// Result type for spiro_canvas operations
pub type Result<T> = std::result::Result<T, CanvasError>;
