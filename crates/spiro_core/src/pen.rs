//! Pen (stroke style) configuration

// ─────────────────────────────────────────────────────────────────────────────
// Cap / Join
// ─────────────────────────────────────────────────────────────────────────────

/// Line cap style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LineCap {
    /// Flat cap at the endpoint
    #[default]
    Butt,
    /// Rounded cap extending past the endpoint
    Round,
    /// Square cap extending past the endpoint
    Square,
}

/// Line join style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LineJoin {
    /// Miter join (sharp corner)
    #[default]
    Miter,
    /// Round join
    Round,
    /// Bevel join (flat corner)
    Bevel,
}

// ─────────────────────────────────────────────────────────────────────────────
// Pen
// ─────────────────────────────────────────────────────────────────────────────

/// Stroke style used when stroking paths and lines
///
/// A pen is immutable once registered with a canvas. Cap and join are
/// recorded but the batch stroker emits one independent quad per segment,
/// so neither affects geometry yet.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pen {
    /// Line width in pixels
    pub line_width: f32,
    /// Line cap style
    pub line_cap: LineCap,
    /// Line join style
    pub line_join: LineJoin,
    /// Miter limit (for Miter joins)
    pub miter_limit: f32,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
        }
    }
}

impl Pen {
    /// Create a new pen with the given width
    pub fn new(line_width: f32) -> Self {
        Self {
            line_width,
            ..Default::default()
        }
    }

    /// Set line cap style
    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.line_cap = cap;
        self
    }

    /// Set line join style
    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.line_join = join;
        self
    }

    /// Set miter limit
    pub fn with_miter_limit(mut self, limit: f32) -> Self {
        self.miter_limit = limit;
        self
    }

    /// Half the line width, the distance each stroke edge sits from the centerline
    pub fn half_width(&self) -> f32 {
        self.line_width * 0.5
    }
}
