//! Batch renderer
//!
//! The [`Renderer`] accumulates quads in a [`VertexBatch`], tracks which
//! textures the pending quads sample in a [`TextureSlotTable`], and hands
//! both to the backend in one draw when either runs out of room, when the
//! caller flushes, or when the frame ends.
//!
//! Quads are appended in local space and mapped through the current
//! state's transform before they are stored, so transform changes in the
//! middle of a frame affect only geometry appended afterwards.

use spiro_core::{Color, Point, StateStack, TextureId};

use crate::backend::{FrameParams, GpuBackend};
use crate::batch::VertexBatch;
use crate::slots::TextureSlotTable;
use crate::Result;

/// Submission counters for the current frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Non-empty flushes (one backend draw each)
    pub draw_calls: usize,
    /// Quads submitted
    pub quads: usize,
}

/// Batched quad renderer over a [`GpuBackend`]
pub struct Renderer<B: GpuBackend> {
    backend: B,
    batch: VertexBatch,
    slots: TextureSlotTable,
    state: StateStack,
    stats: FrameStats,
    frame: Option<FrameParams>,
}

impl<B: GpuBackend> Renderer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            batch: VertexBatch::new(),
            slots: TextureSlotTable::new(),
            state: StateStack::new(),
            stats: FrameStats::default(),
            frame: None,
        }
    }

    /// Start a frame of `width` x `height` pixels
    ///
    /// Discards anything still pending from before and resets the frame
    /// counters. The state stack carries over from the previous frame.
    pub fn begin_frame(&mut self, width: u32, height: u32) -> Result<()> {
        self.batch.clear();
        self.slots.clear();
        self.stats = FrameStats::default();

        let params = FrameParams::new(width, height);
        self.frame = Some(params);
        self.backend.begin_frame(&params)
    }

    /// Flush pending geometry and finish the frame
    pub fn end_frame(&mut self) -> Result<()> {
        self.flush();
        self.frame = None;
        self.backend.end_frame()
    }

    /// Submit the pending batch as one draw call
    ///
    /// The slot table is always emptied, even when there is nothing to draw.
    pub fn flush(&mut self) {
        if !self.batch.is_empty() {
            tracing::trace!(
                "Flushing {} quads with {} textures",
                self.batch.quad_count(),
                self.slots.len()
            );
            self.backend
                .draw(self.batch.vertices(), self.slots.textures());
            self.stats.draw_calls += 1;
            self.stats.quads += self.batch.quad_count();
            self.batch.clear();
        }
        self.slots.clear();
    }

    /// Slot index `texture` is bound to in the pending batch
    ///
    /// Binds the texture to the next free slot, flushing first when all
    /// slots are taken. The index is valid for quads appended until the next
    /// flush.
    pub fn resolve_slot(&mut self, texture: TextureId) -> u32 {
        for _ in 0..2 {
            if let Some(slot) = self.slots.resolve(texture) {
                return slot;
            }
            tracing::trace!("Texture slots exhausted, flushing");
            self.flush();
        }
        unreachable!("slot table is empty after a flush")
    }

    /// Append a quad given by local-space corners in drawing order
    ///
    /// `slot` is a slot index from [`resolve_slot`](Self::resolve_slot), or
    /// `None` to use `color` untextured. Flushes first when the batch has no
    /// room, which invalidates any slot resolved beforehand; textured quads
    /// should go through [`append_textured_quad`](Self::append_textured_quad).
    pub fn append_quad(&mut self, corners: [Point; 4], color: Color, slot: Option<u32>, uv: [f32; 4]) {
        if !self.batch.has_room_for_quad() {
            self.flush();
        }
        let corners = self.to_world(corners);
        self.batch.push_quad(corners, color, slot, uv);
    }

    /// Append a quad sampling `texture`, resolving its slot after making room
    pub fn append_textured_quad(
        &mut self,
        corners: [Point; 4],
        color: Color,
        texture: TextureId,
        uv: [f32; 4],
    ) {
        if !self.batch.has_room_for_quad() {
            self.flush();
        }
        let slot = self.resolve_slot(texture);
        let corners = self.to_world(corners);
        self.batch.push_quad(corners, color, Some(slot), uv);
    }

    fn to_world(&self, corners: [Point; 4]) -> [Point; 4] {
        let transform = self.state.top().transform;
        if transform.is_identity() {
            corners
        } else {
            corners.map(|p| transform.transform_point(p))
        }
    }

    /// Flush pending geometry, then clear the target to `color`
    pub fn clear(&mut self, color: Color) {
        self.flush();
        self.backend.clear(color);
    }

    pub fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<TextureId> {
        self.backend.create_texture(width, height, rgba)
    }

    /// Release a texture, flushing first if the pending batch samples it
    pub fn destroy_texture(&mut self, texture: TextureId) {
        if self.slots.contains(texture) {
            self.flush();
        }
        self.backend.destroy_texture(texture);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.backend.resize(width, height);
    }

    pub fn state(&self) -> &StateStack {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut StateStack {
        &mut self.state
    }

    pub fn batch(&self) -> &VertexBatch {
        &self.batch
    }

    pub fn slots(&self) -> &TextureSlotTable {
        &self.slots
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Parameters of the frame in progress
    pub fn frame(&self) -> Option<&FrameParams> {
        self.frame.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::vertex::{MAX_QUADS, MAX_TEXTURES, MAX_VERTICES};
    use spiro_core::Rect;
    use std::f32::consts::FRAC_PI_2;

    fn renderer() -> Renderer<RecordingBackend> {
        let mut renderer = Renderer::new(RecordingBackend::new());
        renderer.begin_frame(800, 600).unwrap();
        renderer
    }

    fn quad() -> [Point; 4] {
        Rect::new(0.0, 0.0, 10.0, 10.0).corners()
    }

    fn textures(renderer: &mut Renderer<RecordingBackend>, n: usize) -> Vec<TextureId> {
        (0..n)
            .map(|_| renderer.create_texture(1, 1, &[255; 4]).unwrap())
            .collect()
    }

    #[test]
    fn test_no_flush_below_capacity() {
        let mut r = renderer();
        for _ in 0..MAX_QUADS {
            r.append_quad(quad(), Color::WHITE, None, [0.0; 4]);
        }
        assert!(r.backend().draws.is_empty());
        assert_eq!(r.batch().len(), MAX_VERTICES);
    }

    #[test]
    fn test_overflow_flushes_once() {
        let mut r = renderer();
        for _ in 0..MAX_QUADS + 1 {
            r.append_quad(quad(), Color::WHITE, None, [0.0; 4]);
        }
        assert_eq!(r.backend().draws.len(), 1);
        assert_eq!(r.backend().draws[0].vertices.len(), MAX_VERTICES);
        assert_eq!(r.batch().len(), 6);
    }

    #[test]
    fn test_slots_fill_then_flush() {
        let mut r = renderer();
        let ids = textures(&mut r, MAX_TEXTURES + 1);

        for (i, &id) in ids[..MAX_TEXTURES].iter().enumerate() {
            assert_eq!(r.resolve_slot(id), i as u32);
            r.append_quad(quad(), Color::WHITE, Some(i as u32), [0.0, 0.0, 1.0, 1.0]);
        }
        assert!(r.backend().draws.is_empty());

        assert_eq!(r.resolve_slot(ids[MAX_TEXTURES]), 0);
        let draws = &r.backend().draws;
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].vertices.len(), MAX_TEXTURES * 6);
        assert_eq!(draws[0].textures, ids[..MAX_TEXTURES].to_vec());
    }

    #[test]
    fn test_resolve_same_texture_is_stable() {
        let mut r = renderer();
        let ids = textures(&mut r, 2);
        assert_eq!(r.resolve_slot(ids[0]), 0);
        assert_eq!(r.resolve_slot(ids[1]), 1);
        assert_eq!(r.resolve_slot(ids[0]), 0);
        assert!(r.backend().draws.is_empty());
    }

    #[test]
    fn test_full_slots_with_empty_batch() {
        let mut r = renderer();
        let ids = textures(&mut r, MAX_TEXTURES + 1);
        for &id in &ids[..MAX_TEXTURES] {
            r.resolve_slot(id);
        }
        // Nothing appended: the flush draws nothing but frees the slots
        assert_eq!(r.resolve_slot(ids[MAX_TEXTURES]), 0);
        assert!(r.backend().draws.is_empty());
    }

    #[test]
    fn test_textured_quad_at_capacity_keeps_valid_slot() {
        let mut r = renderer();
        let ids = textures(&mut r, 2);
        r.resolve_slot(ids[0]);
        for _ in 0..MAX_QUADS {
            r.append_quad(quad(), Color::WHITE, None, [0.0; 4]);
        }

        r.append_textured_quad(quad(), Color::WHITE, ids[1], [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(r.backend().draws.len(), 1);
        assert_eq!(r.slots().textures(), &[ids[1]]);
        assert!(r.batch().vertices().iter().all(|v| v.tex_slot == 0.0));
    }

    #[test]
    fn test_end_frame_flushes_and_counts() {
        let mut r = renderer();
        r.append_quad(quad(), Color::RED, None, [0.0; 4]);
        r.append_quad(quad(), Color::RED, None, [0.0; 4]);
        r.end_frame().unwrap();

        assert_eq!(r.backend().draws.len(), 1);
        assert_eq!(r.backend().frames_ended, 1);
        assert_eq!(
            r.stats(),
            FrameStats {
                draw_calls: 1,
                quads: 2
            }
        );

        r.begin_frame(800, 600).unwrap();
        assert_eq!(r.stats(), FrameStats::default());
    }

    #[test]
    fn test_flush_empty_is_noop() {
        let mut r = renderer();
        r.flush();
        r.end_frame().unwrap();
        assert!(r.backend().draws.is_empty());
        assert_eq!(r.stats().draw_calls, 0);
    }

    #[test]
    fn test_begin_frame_discards_pending() {
        let mut r = renderer();
        r.append_quad(quad(), Color::WHITE, None, [0.0; 4]);
        r.begin_frame(640, 480).unwrap();
        assert!(r.batch().is_empty());
        let params = r.backend().last_frame.unwrap();
        assert_eq!((params.width, params.height), (640, 480));
    }

    #[test]
    fn test_transform_applied_at_append() {
        let mut r = renderer();
        r.state_mut().translate(10.0, 0.0);
        r.state_mut().rotate(FRAC_PI_2);
        let p = Point::new(1.0, 0.0);
        r.append_quad([p; 4], Color::WHITE, None, [0.0; 4]);

        let v = r.batch().vertices()[0].position;
        assert!((v[0] - 10.0).abs() < 1e-5 && (v[1] - 1.0).abs() < 1e-5);

        // Later changes only affect later geometry
        r.state_mut().reset_transform();
        r.append_quad([p; 4], Color::WHITE, None, [0.0; 4]);
        assert_eq!(r.batch().vertices()[6].position, [1.0, 0.0]);
        assert!((r.batch().vertices()[0].position[0] - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_clear_flushes_first() {
        let mut r = renderer();
        r.append_quad(quad(), Color::WHITE, None, [0.0; 4]);
        r.clear(Color::BLACK);
        assert_eq!(r.backend().draws.len(), 1);
        assert_eq!(r.backend().clears, vec![Color::BLACK]);
    }

    #[test]
    fn test_destroy_bound_texture_flushes() {
        let mut r = renderer();
        let ids = textures(&mut r, 2);
        r.append_textured_quad(quad(), Color::WHITE, ids[0], [0.0, 0.0, 1.0, 1.0]);

        r.destroy_texture(ids[1]);
        assert!(r.backend().draws.is_empty());

        r.destroy_texture(ids[0]);
        assert_eq!(r.backend().draws.len(), 1);
        assert_eq!(r.backend().texture_count(), 0);
    }
}
