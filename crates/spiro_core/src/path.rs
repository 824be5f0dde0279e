//! Polyline paths
//!
//! Paths only record straight segments. Arcs and curves are accepted by the
//! canvas API but contribute no points.

use smallvec::SmallVec;

use crate::geometry::Point;

/// Ordered point sequence stroked as consecutive segments
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    points: SmallVec<[Point; 16]>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a path from a point list (first point is the move-to)
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        Self {
            points: points.into_iter().collect(),
        }
    }

    /// Start the path over at `(x, y)`, discarding earlier points
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.points.clear();
        self.points.push(Point::new(x, y));
    }

    /// Append a straight segment to `(x, y)`
    pub fn line_to(&mut self, x: f32, y: f32) {
        self.points.push(Point::new(x, y));
    }

    /// Close the path back to its first point
    ///
    /// Requires at least two points; shorter paths are left untouched.
    pub fn close(&mut self) {
        if self.points.len() > 1 {
            let first = self.points[0];
            self.points.push(first);
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
