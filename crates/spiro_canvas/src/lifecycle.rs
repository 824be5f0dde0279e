//! Process-wide initialization
//!
//! [`Spiro`] owns the wgpu instance every GPU canvas is created from. Only
//! one may be live at a time. Canvases keep a shared liveness flag so that
//! frames started after [`Spiro::terminate`] fail with
//! [`CanvasError::Terminated`] instead of touching a torn-down instance.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use spiro_gpu::{RendererConfig, WgpuBackend};

use crate::canvas::Canvas;
use crate::config::CanvasConfig;
use crate::error::{CanvasError, Result};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Handle to the initialized renderer backend
pub struct Spiro {
    instance: wgpu::Instance,
    renderer_config: RendererConfig,
    alive: Arc<AtomicBool>,
}

impl Spiro {
    /// Initialize with default renderer settings
    pub fn initialize() -> Result<Self> {
        Self::with_config(RendererConfig::default())
    }

    /// Initialize with custom renderer settings
    ///
    /// Fails with [`CanvasError::AlreadyInitialized`] while another instance
    /// is live.
    pub fn with_config(renderer_config: RendererConfig) -> Result<Self> {
        if INITIALIZED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CanvasError::AlreadyInitialized);
        }

        tracing::debug!("Initializing Spiro");
        Ok(Self {
            instance: WgpuBackend::create_instance(),
            renderer_config,
            alive: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Whether a `Spiro` instance is currently live in this process
    pub fn is_initialized() -> bool {
        INITIALIZED.load(Ordering::Acquire)
    }

    /// Create a canvas that renders into an offscreen texture
    pub fn create_offscreen_canvas(&self, config: CanvasConfig) -> Result<Canvas<WgpuBackend>> {
        let backend = pollster::block_on(WgpuBackend::offscreen(
            &self.instance,
            config.width,
            config.height,
            self.backend_config(&config),
        ))?;
        Ok(Canvas::with_liveness(backend, config, self.alive.clone()))
    }

    /// Create a canvas presenting to a host window
    pub fn create_canvas<W>(&self, window: Arc<W>, config: CanvasConfig) -> Result<Canvas<WgpuBackend>>
    where
        W: raw_window_handle::HasWindowHandle
            + raw_window_handle::HasDisplayHandle
            + Send
            + Sync
            + 'static,
    {
        let backend = pollster::block_on(WgpuBackend::with_surface(
            &self.instance,
            window,
            config.width,
            config.height,
            self.backend_config(&config),
        ))?;
        Ok(Canvas::with_liveness(backend, config, self.alive.clone()))
    }

    fn backend_config(&self, config: &CanvasConfig) -> RendererConfig {
        RendererConfig {
            vsync: config.vsync,
            ..self.renderer_config.clone()
        }
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    /// Shut down; canvases created from this instance stop rendering
    pub fn terminate(self) {
        drop(self);
    }
}

impl Drop for Spiro {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
        INITIALIZED.store(false, Ordering::Release);
        tracing::debug!("Terminated Spiro");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: the guard is process-wide
    #[test]
    fn test_initialize_guard() {
        let spiro = Spiro::initialize().unwrap();
        assert!(Spiro::is_initialized());
        assert!(matches!(
            Spiro::initialize(),
            Err(CanvasError::AlreadyInitialized)
        ));

        let alive = spiro.alive.clone();
        spiro.terminate();
        assert!(!alive.load(Ordering::Acquire));
        assert!(!Spiro::is_initialized());

        let again = Spiro::initialize().unwrap();
        drop(again);
        assert!(!Spiro::is_initialized());
    }
}
