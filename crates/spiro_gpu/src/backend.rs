//! GPU backend abstraction
//!
//! The [`Renderer`](crate::Renderer) never talks to a graphics API directly.
//! Everything that touches the device goes through [`GpuBackend`]: texture
//! lifetime, frame begin/end, clears, and one call per flushed batch.

use slotmap::SlotMap;
use spiro_core::{Color, Mat4, TextureId};

use crate::vertex::Vertex;
use crate::{GpuError, Result};

/// Per-frame parameters handed to the backend at frame start
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameParams {
    /// Target width in pixels
    pub width: u32,
    /// Target height in pixels
    pub height: u32,
    /// Pixel space to clip space, origin top-left with y down
    pub projection: Mat4,
}

impl FrameParams {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            projection: Mat4::orthographic(0.0, width as f32, height as f32, 0.0, -1.0, 1.0),
        }
    }
}

/// Device operations the batch renderer depends on
pub trait GpuBackend {
    /// Upload a tightly packed RGBA8 texture
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<TextureId>;

    /// Release a texture; unknown ids are ignored
    fn destroy_texture(&mut self, texture: TextureId);

    /// Start a frame targeting `params.width` x `params.height`
    fn begin_frame(&mut self, params: &FrameParams) -> Result<()>;

    /// Clear the whole target to `color`
    fn clear(&mut self, color: Color);

    /// Draw `vertices` as a triangle list with `textures[i]` bound to slot `i`
    fn draw(&mut self, vertices: &[Vertex], textures: &[TextureId]);

    /// Finish the frame (submit and present)
    fn end_frame(&mut self) -> Result<()>;

    /// Resize the render target
    fn resize(&mut self, _width: u32, _height: u32) {}
}

pub(crate) fn validate_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(GpuError::InvalidTextureSize { width, height });
    }
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(GpuError::InvalidTextureData {
            expected,
            actual: rgba.len(),
        });
    }
    Ok(())
}

/// A texture known to the [`RecordingBackend`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedTexture {
    pub width: u32,
    pub height: u32,
}

/// One submitted batch
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    pub vertices: Vec<Vertex>,
    pub textures: Vec<TextureId>,
}

impl DrawCall {
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 6
    }
}

/// Backend that records submissions instead of rendering
///
/// Used for headless canvases and for testing batching behaviour without
/// a GPU.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    textures: SlotMap<TextureId, RecordedTexture>,
    /// Every draw since the backend was created
    pub draws: Vec<DrawCall>,
    /// Every clear color since the backend was created
    pub clears: Vec<Color>,
    /// Parameters of the most recent frame
    pub last_frame: Option<FrameParams>,
    pub frames_begun: usize,
    pub frames_ended: usize,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texture(&self, texture: TextureId) -> Option<&RecordedTexture> {
        self.textures.get(texture)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Total vertices across all recorded draws
    pub fn vertex_count(&self) -> usize {
        self.draws.iter().map(|d| d.vertices.len()).sum()
    }

    /// Forget recorded draws and clears, keeping textures
    pub fn reset_log(&mut self) {
        self.draws.clear();
        self.clears.clear();
    }
}

impl GpuBackend for RecordingBackend {
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<TextureId> {
        validate_rgba(width, height, rgba)?;
        Ok(self.textures.insert(RecordedTexture { width, height }))
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.textures.remove(texture);
    }

    fn begin_frame(&mut self, params: &FrameParams) -> Result<()> {
        self.frames_begun += 1;
        self.last_frame = Some(*params);
        Ok(())
    }

    fn clear(&mut self, color: Color) {
        self.clears.push(color);
    }

    fn draw(&mut self, vertices: &[Vertex], textures: &[TextureId]) {
        self.draws.push(DrawCall {
            vertices: vertices.to_vec(),
            textures: textures.to_vec(),
        });
    }

    fn end_frame(&mut self) -> Result<()> {
        self.frames_ended += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spiro_core::Point;

    #[test]
    fn test_projection_maps_pixels_to_clip() {
        let params = FrameParams::new(800, 600);
        let top_left = params.projection.transform_homogeneous(Point::new(0.0, 0.0));
        let bottom_right = params
            .projection
            .transform_homogeneous(Point::new(800.0, 600.0));
        assert!((top_left[0] + 1.0).abs() < 1e-6 && (top_left[1] - 1.0).abs() < 1e-6);
        assert!((bottom_right[0] - 1.0).abs() < 1e-6 && (bottom_right[1] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_texture_validation() {
        let mut backend = RecordingBackend::new();
        let id = backend.create_texture(2, 2, &[0; 16]).unwrap();
        assert_eq!(
            backend.texture(id),
            Some(&RecordedTexture {
                width: 2,
                height: 2
            })
        );
        assert!(matches!(
            backend.create_texture(2, 2, &[0; 15]),
            Err(GpuError::InvalidTextureData {
                expected: 16,
                actual: 15
            })
        ));
        assert!(matches!(
            backend.create_texture(0, 2, &[]),
            Err(GpuError::InvalidTextureSize { .. })
        ));

        backend.destroy_texture(id);
        backend.destroy_texture(id);
        assert_eq!(backend.texture_count(), 0);
    }
}
