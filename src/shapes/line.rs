use crate::math::{distance_to_line, edge_intersect_point};
use crate::shapes::{Rect, Shape};
use crate::vector::{Point, Vector};

// How far a point may sit from the segment and still count as "on" it
pub const LINE_TOLERANCE: f32 = 1e-3;

/// Line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub a: Point,
    pub b: Point,
}

impl Line {
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    pub fn length(&self) -> f32 {
        self.a.distance(self.b)
    }

    pub fn direction(&self) -> Vector {
        self.b - self.a
    }

    pub fn midpoint(&self) -> Point {
        self.a.midpoint(self.b)
    }

    pub fn distance_to(&self, p: Point) -> f32 {
        distance_to_line(p, self.a, self.b)
    }

    pub fn intersection(&self, other: &Line) -> Option<Point> {
        edge_intersect_point(self.a, self.b, other.a, other.b)
    }

    pub fn intersects_line(&self, other: &Line) -> bool {
        self.intersection(other).is_some()
    }
}

impl Shape for Line {
    fn contains(&self, point: Point) -> bool {
        self.distance_to(point) <= LINE_TOLERANCE
    }

    // Tested against the rect grown by the containment tolerance (plus slack
    // for rounding) so no point `contains` accepts is ever pruned
    fn intersects_rect(&self, rect: &Rect) -> bool {
        let rect = rect.expand(LINE_TOLERANCE * 2.0);
        if rect.contains_closed(self.a) || rect.contains_closed(self.b) {
            return true;
        }
        let c = rect.corners();
        (0..4).any(|i| edge_intersect_point(self.a, self.b, c[i], c[(i + 1) % 4]).is_some())
    }

    fn aabb(&self) -> Rect {
        Rect::from_corners(self.a, self.b)
    }
}
