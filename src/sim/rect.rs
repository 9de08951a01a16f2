//! Axis-aligned rectangle geometry for blocks and the field
//!
//! Rectangles use field-local coordinates: origin top-left, y grows downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Point containment, edges inclusive
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Nearest point on (or in) the rectangle to `point`
    #[inline]
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.x, self.right()),
            point.y.clamp(self.y, self.bottom()),
        )
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// Exact AABB overlap. Rectangles that only share an edge do not overlap.
#[inline]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Edge-to-edge adjacency used for merging.
///
/// True when a vertical edge of `a` sits within `tolerance` of the facing
/// vertical edge of `b` while their vertical ranges overlap, or the same for
/// horizontal edges with overlapping horizontal ranges.
pub fn rects_adjacent(a: &Rect, b: &Rect, tolerance: f32) -> bool {
    let rows_overlap = a.y < b.bottom() && a.bottom() > b.y;
    let cols_overlap = a.x < b.right() && a.right() > b.x;

    let side_by_side =
        (a.x - b.right()).abs() <= tolerance || (a.right() - b.x).abs() <= tolerance;
    let stacked =
        (a.y - b.bottom()).abs() <= tolerance || (a.bottom() - b.y).abs() <= tolerance;

    (side_by_side && rows_overlap) || (stacked && cols_overlap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rects_overlap() {
        let a = Rect::new(0.0, 0.0, 120.0, 50.0);
        assert!(rects_overlap(&a, &Rect::new(60.0, 25.0, 120.0, 50.0)));
        // Shared edge is not an overlap
        assert!(!rects_overlap(&a, &Rect::new(120.0, 0.0, 120.0, 50.0)));
        assert!(!rects_overlap(&a, &Rect::new(0.0, 50.0, 120.0, 50.0)));
        assert!(!rects_overlap(&a, &Rect::new(200.0, 200.0, 10.0, 10.0)));
    }

    #[test]
    fn test_rects_adjacent_side_by_side() {
        let a = Rect::new(5.0, 5.0, 120.0, 50.0);
        // Touching on the right
        assert!(rects_adjacent(&a, &Rect::new(125.0, 5.0, 120.0, 50.0), 8.0));
        // Small gap within tolerance
        assert!(rects_adjacent(&a, &Rect::new(131.0, 20.0, 120.0, 50.0), 8.0));
        // Gap too large
        assert!(!rects_adjacent(&a, &Rect::new(140.0, 5.0, 120.0, 50.0), 8.0));
        // Close edge but rows don't overlap
        assert!(!rects_adjacent(&a, &Rect::new(125.0, 60.0, 120.0, 50.0), 8.0));
    }

    #[test]
    fn test_rects_adjacent_stacked() {
        let a = Rect::new(5.0, 5.0, 120.0, 50.0);
        assert!(rects_adjacent(&a, &Rect::new(40.0, 58.0, 120.0, 50.0), 8.0));
        assert!(rects_adjacent(&Rect::new(40.0, 58.0, 120.0, 50.0), &a, 8.0));
        // Diagonal corner contact is not adjacency
        assert!(!rects_adjacent(&a, &Rect::new(125.0, 55.0, 120.0, 50.0), 8.0));
    }

    #[test]
    fn test_contains_and_clamp() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Vec2::new(10.0, 30.0)));
        assert!(!r.contains(Vec2::new(9.9, 15.0)));
        assert_eq!(r.clamp_point(Vec2::new(0.0, 15.0)), Vec2::new(10.0, 15.0));
        assert_eq!(r.center(), Vec2::new(20.0, 20.0));
    }

    #[test]
    fn test_union() {
        let a = Rect::new(100.0, 5.0, 120.0, 50.0);
        let b = Rect::new(100.0, 95.0, 120.0, 50.0);
        assert_eq!(a.union(&b), Rect::new(100.0, 5.0, 120.0, 140.0));
        assert_eq!(a.union(&a), a);
    }
}
