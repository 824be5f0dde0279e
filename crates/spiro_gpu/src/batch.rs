//! CPU-side vertex accumulation

use spiro_core::{Color, Point};

use crate::vertex::{Vertex, MAX_VERTICES, UNTEXTURED};

/// Vertices accumulated since the last flush
///
/// Quads are stored whole: the length is always a multiple of 6.
#[derive(Debug, Default)]
pub struct VertexBatch {
    vertices: Vec<Vertex>,
}

impl VertexBatch {
    pub fn new() -> Self {
        Self {
            vertices: Vec::with_capacity(MAX_VERTICES),
        }
    }

    /// Whether another quad fits without exceeding [`MAX_VERTICES`]
    pub fn has_room_for_quad(&self) -> bool {
        self.vertices.len() + 6 <= MAX_VERTICES
    }

    /// Push a quad as triangles `(p1, p2, p3)` and `(p1, p3, p4)`
    ///
    /// `uv` is `[u0, v0, u1, v1]`; corners map to `p1 = (u0, v0)`,
    /// `p2 = (u1, v0)`, `p3 = (u1, v1)`, `p4 = (u0, v1)`.
    pub fn push_quad(&mut self, corners: [Point; 4], color: Color, slot: Option<u32>, uv: [f32; 4]) {
        debug_assert!(self.has_room_for_quad());

        let color = color.to_array();
        let tex_slot = slot.map_or(UNTEXTURED, |s| s as f32);
        let [u0, v0, u1, v1] = uv;
        let tex = [[u0, v0], [u1, v0], [u1, v1], [u0, v1]];

        for i in [0, 1, 2, 0, 2, 3] {
            self.vertices.push(Vertex {
                position: [corners[i].x, corners[i].y],
                color,
                tex_coord: tex[i],
                tex_slot,
            });
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 6
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quad() -> [Point; 4] {
        [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_quad_winding_and_uvs() {
        let mut batch = VertexBatch::new();
        batch.push_quad(unit_quad(), Color::RED, Some(3), [0.0, 0.0, 1.0, 1.0]);

        let v = batch.vertices();
        assert_eq!(v.len(), 6);
        let positions: Vec<[f32; 2]> = v.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![
                [0.0, 0.0],
                [1.0, 0.0],
                [1.0, 1.0],
                [0.0, 0.0],
                [1.0, 1.0],
                [0.0, 1.0]
            ]
        );
        assert_eq!(v[1].tex_coord, [1.0, 0.0]);
        assert_eq!(v[5].tex_coord, [0.0, 1.0]);
        assert!(v.iter().all(|v| v.tex_slot == 3.0 && v.color == [1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_untextured_tag() {
        let mut batch = VertexBatch::new();
        batch.push_quad(unit_quad(), Color::WHITE, None, [0.0; 4]);
        assert!(batch.vertices().iter().all(|v| v.slot().is_none()));
        assert_eq!(batch.quad_count(), 1);
    }

    #[test]
    fn test_room_at_capacity() {
        let mut batch = VertexBatch::new();
        for _ in 0..MAX_VERTICES / 6 {
            batch.push_quad(unit_quad(), Color::WHITE, None, [0.0; 4]);
        }
        assert_eq!(batch.len(), MAX_VERTICES);
        assert!(!batch.has_room_for_quad());
        batch.clear();
        assert!(batch.is_empty() && batch.has_room_for_quad());
    }
}
