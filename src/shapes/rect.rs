use serde::{Deserialize, Serialize};

use crate::shapes::Shape;
use crate::vector::{pt, Point};

/// Axis-aligned rectangle with its origin at the minimum corner.
///
/// `contains` is half-open (`[x, x + w) × [y, y + h)`) so that rectangles
/// tiling a region never both claim a point on a shared edge. `intersects` is
/// closed, which makes it a safe (never too strict) pruning test.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    // Build from any two opposite corners
    pub fn from_corners(a: Point, b: Point) -> Self {
        let min_x = a.x.min(b.x);
        let min_y = a.y.min(b.y);
        Self::new(min_x, min_y, a.x.max(b.x) - min_x, a.y.max(b.y) - min_y)
    }

    pub fn from_center(center: Point, w: f32, h: f32) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    #[inline]
    pub fn min_x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn max_x(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn min_y(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn max_y(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Point {
        pt(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }

    // Closed containment, used where the boundary itself counts
    #[inline]
    pub fn contains_closed(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.x + other.w
            && other.x <= self.x + self.w
            && self.y <= other.y + other.h
            && other.y <= self.y + self.h
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.w <= self.x + self.w
            && other.y + other.h <= self.y + self.h
    }

    /// Grow by `margin` on every side (shrinks for a negative margin).
    pub fn expand(&self, margin: f32) -> Rect {
        Rect::new(self.x - margin, self.y - margin, self.w + margin * 2.0, self.h + margin * 2.0)
    }

    // Counter-clockwise, starting at the minimum corner
    pub fn corners(&self) -> [Point; 4] {
        [
            pt(self.min_x(), self.min_y()),
            pt(self.max_x(), self.min_y()),
            pt(self.max_x(), self.max_y()),
            pt(self.min_x(), self.max_y()),
        ]
    }

    /// Closest point inside (or on) the rectangle to `p`.
    pub fn clamp_point(&self, p: Point) -> Point {
        pt(p.x.clamp(self.min_x(), self.max_x()), p.y.clamp(self.min_y(), self.max_y()))
    }

    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite() && self.w > 0.0 && self.h > 0.0
    }
}

impl Shape for Rect {
    fn contains(&self, point: Point) -> bool {
        Rect::contains(self, point)
    }

    fn intersects_rect(&self, rect: &Rect) -> bool {
        self.intersects(rect)
    }

    fn aabb(&self) -> Rect {
        *self
    }
}
