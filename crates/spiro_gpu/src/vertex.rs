//! Batch vertex format
//!
//! Matches the vertex input of `BATCH_SHADER`. All fields are `f32` so the
//! struct can be uploaded with a plain `bytemuck` cast.

/// Maximum vertices held by one batch (10000 quads)
pub const MAX_VERTICES: usize = 60_000;

/// Maximum quads held by one batch
pub const MAX_QUADS: usize = MAX_VERTICES / 6;

/// Texture bindings available to one draw call
pub const MAX_TEXTURES: usize = 16;

/// `tex_slot` tag for vertices that use their color directly
pub const UNTEXTURED: f32 = -1.0;

/// A batch vertex
///
/// Memory layout:
/// - position: `vec2<f32>`  (8 bytes)
/// - color: `vec4<f32>`     (16 bytes)
/// - tex_coord: `vec2<f32>` (8 bytes)
/// - tex_slot: `f32`        (4 bytes)
/// Total: 36 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Canvas-space position in pixels
    pub position: [f32; 2],
    /// Straight-alpha RGBA color
    pub color: [f32; 4],
    /// Texture coordinate (ignored when untextured)
    pub tex_coord: [f32; 2],
    /// Sampler slot, or [`UNTEXTURED`]
    pub tex_slot: f32,
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x4,
        2 => Float32x2,
        3 => Float32,
    ];

    /// Vertex buffer layout for the batch pipeline
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Slot index this vertex samples from, `None` when untextured
    pub fn slot(&self) -> Option<u32> {
        if self.tex_slot < 0.0 {
            None
        } else {
            Some(self.tex_slot.round() as u32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), 36);
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 36);
        assert_eq!(layout.attributes[3].offset, 32);
    }

    #[test]
    fn test_capacity_is_whole_quads() {
        assert_eq!(MAX_VERTICES % 6, 0);
        assert_eq!(MAX_QUADS, 10_000);
    }
}
