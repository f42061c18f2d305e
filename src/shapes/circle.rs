use std::f32::consts::TAU;

use crate::error::GeometryError;
use crate::shapes::{Polygon, Rect, Shape};
use crate::vector::{pt, Point, Vector};

/// Circle with a cached squared radius for the containment hot path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    center: Point,
    radius: f32,
    radius_sq: f32,
}

impl Circle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self::at(pt(x, y), radius)
    }

    pub fn at(center: Point, radius: f32) -> Self {
        let radius = radius.abs();
        Self {
            center,
            radius,
            radius_sq: radius * radius,
        }
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_center(&mut self, center: Point) {
        self.center = center;
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.abs();
        self.radius_sq = self.radius * self.radius;
    }

    pub fn intersects_circle(&self, other: &Circle) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) <= reach * reach
    }

    /// Regular polygon approximation, used when a circle has to go through SAT.
    pub fn to_polygon(&self, segments: usize) -> Result<Polygon, GeometryError> {
        if segments < 3 {
            return Err(GeometryError::TooFewSegments(segments));
        }
        let vertices = (0..segments)
            .map(|i| self.center + Vector::from_angle(i as f32 / segments as f32 * TAU) * self.radius)
            .collect();
        Polygon::new(vertices)
    }
}

impl Shape for Circle {
    #[inline]
    fn contains(&self, point: Point) -> bool {
        self.center.distance_squared(point) <= self.radius_sq
    }

    fn intersects_rect(&self, rect: &Rect) -> bool {
        let closest = rect.clamp_point(self.center);
        self.center.distance_squared(closest) <= self.radius_sq
    }

    fn aabb(&self) -> Rect {
        Rect::from_center(self.center, self.radius * 2.0, self.radius * 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn contains_includes_boundary() {
        let c = Circle::new(0.0, 0.0, 5.0);
        assert!(c.contains(pt(3.0, 4.0)));
        assert!(c.contains(pt(0.0, 0.0)));
        assert!(!c.contains(pt(3.0, 4.1)));
    }

    #[test]
    fn set_radius_refreshes_cache() {
        let mut c = Circle::new(0.0, 0.0, 1.0);
        assert!(!c.contains(pt(2.0, 0.0)));
        c.set_radius(2.0);
        assert!(c.contains(pt(2.0, 0.0)));
    }

    #[test]
    fn rect_intersection_uses_closest_point() {
        let c = Circle::new(0.0, 0.0, 1.0);
        assert!(c.intersects_rect(&Rect::new(0.5, -0.5, 2.0, 1.0)));
        // Corner just out of reach along the diagonal
        assert!(!c.intersects_rect(&Rect::new(0.8, 0.8, 1.0, 1.0)));
        // Rect surrounding the circle
        assert!(c.intersects_rect(&Rect::new(-10.0, -10.0, 20.0, 20.0)));
    }

    #[test]
    fn polygon_approximation() {
        let c = Circle::new(1.0, 1.0, 2.0);
        let poly = c.to_polygon(16).unwrap();
        assert_eq!(poly.vertices().len(), 16);
        assert_abs_diff_eq!(poly.centroid().x, 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(poly.centroid().y, 1.0, epsilon = 1e-4);
        assert_eq!(c.to_polygon(2), Err(GeometryError::TooFewSegments(2)));
    }
}
