//! Render state and the save/restore stack
//!
//! The stack always holds at least one [`RenderState`]. `save` pushes a copy
//! of the top, `restore` pops it unless only the base entry remains. Every
//! mutation touches the top entry only.

use crate::color::Color;
use crate::handles::{FontId, PenId};
use crate::transform::Mat4;

/// Font size of the initial state
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Snapshot of transform and style used for subsequently drawn geometry
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderState {
    /// Local-to-canvas transform
    pub transform: Mat4,
    /// Draw color
    pub color: Color,
    /// Active pen (referenced, not owned)
    pub pen: Option<PenId>,
    /// Active font (referenced, not owned)
    pub font: Option<FontId>,
    /// Font size in pixels
    pub font_size: f32,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            color: Color::WHITE,
            pen: None,
            font: None,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// LIFO stack of render states with a floor of one entry
#[derive(Clone, Debug)]
pub struct StateStack {
    states: Vec<RenderState>,
}

impl Default for StateStack {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStack {
    pub fn new() -> Self {
        Self {
            states: vec![RenderState::default()],
        }
    }

    /// Current state
    pub fn top(&self) -> &RenderState {
        // The base entry is never popped
        &self.states[self.states.len() - 1]
    }

    fn top_mut(&mut self) -> &mut RenderState {
        let last = self.states.len() - 1;
        &mut self.states[last]
    }

    /// Number of entries, always at least 1
    pub fn depth(&self) -> usize {
        self.states.len()
    }

    /// Push a copy of the current state
    pub fn save(&mut self) {
        let top = *self.top();
        self.states.push(top);
    }

    /// Pop the current state; a no-op when only the base state remains
    pub fn restore(&mut self) {
        if self.states.len() > 1 {
            self.states.pop();
        }
    }

    /// Drop every saved state and return to the initial state
    pub fn reset_all(&mut self) {
        self.states.clear();
        self.states.push(RenderState::default());
    }

    /// Set the current transform to identity, leaving style untouched
    pub fn reset_transform(&mut self) {
        self.top_mut().transform = Mat4::IDENTITY;
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.concat(&Mat4::translation(x, y, 0.0));
    }

    pub fn rotate(&mut self, angle_radians: f32) {
        self.concat(&Mat4::rotation_z(angle_radians));
    }

    pub fn scale(&mut self, x: f32, y: f32) {
        self.concat(&Mat4::scale(x, y, 1.0));
    }

    /// Right-multiply the current transform (`M = M * m`)
    pub fn concat(&mut self, m: &Mat4) {
        let top = self.top_mut();
        top.transform = top.transform.mul(m);
    }

    pub fn set_color(&mut self, color: Color) {
        self.top_mut().color = color;
    }

    pub fn set_pen(&mut self, pen: Option<PenId>) {
        self.top_mut().pen = pen;
    }

    pub fn set_font(&mut self, font: Option<FontId>, size: f32) {
        let top = self.top_mut();
        top.font = font;
        top.font_size = size;
    }
}
