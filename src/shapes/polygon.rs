/*
 * Polygon
 *
 * An ordered list of at least three vertices. Vertex 0 is the polygon's
 * position. Edge vectors, centroid and bounding box are cached and rebuilt
 * by every method that moves a vertex, so the cache can never be observed
 * stale (SAT relies on the cached bounding box for its broad phase).
 */

use std::f32::consts::TAU;

use crate::error::GeometryError;
use crate::math::{distance_to_line, edge_intersect_point};
use crate::sat;
use crate::shapes::{Circle, Line, Rect, Shape};
use crate::vector::{Point, Vector, EPSILON};

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
    edges: Vec<Vector>,
    centroid: Point,
    aabb: Rect,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Result<Self, GeometryError> {
        Self::validate(&vertices)?;
        let mut polygon = Self {
            vertices,
            edges: Vec::new(),
            centroid: Point::ORIGIN,
            aabb: Rect::default(),
        };
        polygon.update_edges();
        Ok(polygon)
    }

    /// Regular polygon with `sides` vertices on a circle of `radius`.
    /// The first vertex sits at `rotation` radians.
    pub fn regular(center: Point, radius: f32, sides: usize, rotation: f32) -> Result<Self, GeometryError> {
        let vertices = (0..sides)
            .map(|i| center + Vector::from_angle(rotation + i as f32 / sides as f32 * TAU) * radius)
            .collect();
        Self::new(vertices)
    }

    fn validate(vertices: &[Point]) -> Result<(), GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices(vertices.len()));
        }
        if let Some(index) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(GeometryError::NonFiniteVertex { index });
        }
        Ok(())
    }

    // Rebuild edges, centroid and bounding box from the vertices
    fn update_edges(&mut self) {
        let n = self.vertices.len();
        self.edges.clear();
        self.edges.reserve(n);

        let mut min = self.vertices[0];
        let mut max = self.vertices[0];
        let mut twice_area = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;

        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            self.edges.push(b - a);

            min.x = min.x.min(a.x);
            min.y = min.y.min(a.y);
            max.x = max.x.max(a.x);
            max.y = max.y.max(a.y);

            let cross = a.x * b.y - b.x * a.y;
            twice_area += cross;
            cx += (a.x + b.x) * cross;
            cy += (a.y + b.y) * cross;
        }

        self.aabb = Rect::from_corners(min, max);
        self.centroid = if twice_area.abs() > EPSILON {
            Point::new(cx / (3.0 * twice_area), cy / (3.0 * twice_area))
        } else {
            // Degenerate (zero-area) polygon: fall back to the vertex average
            let sum = self.vertices.iter().fold(Vector::ZERO, |acc, v| acc + v.to_vector());
            let avg = sum / n as f32;
            Point::new(avg.x, avg.y)
        };
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Vector] {
        &self.edges
    }

    pub fn centroid(&self) -> Point {
        self.centroid
    }

    pub fn bounding_box(&self) -> &Rect {
        &self.aabb
    }

    pub fn position(&self) -> Point {
        self.vertices[0]
    }

    /// Signed area; positive for counter-clockwise winding.
    pub fn signed_area(&self) -> f32 {
        let n = self.vertices.len();
        (0..n)
            .map(|i| self.vertices[i].to_vector().cross(self.vertices[(i + 1) % n].to_vector()))
            .sum::<f32>()
            / 2.0
    }

    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }

    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area() >= 0.0
    }

    /// Outward unit normal of every edge. Zero-length edges are skipped.
    pub fn normals(&self) -> impl Iterator<Item = Vector> + '_ {
        let ccw = self.is_counter_clockwise();
        self.edges.iter().filter_map(move |e| {
            let outward = if ccw { Vector::new(e.y, -e.x) } else { e.perp() };
            outward.try_normalize()
        })
    }

    pub fn is_concave(&self) -> bool {
        sat::calculate_is_concave(self)
    }

    pub fn translate(&mut self, offset: Vector) {
        for v in &mut self.vertices {
            *v += offset;
        }
        self.update_edges();
    }

    // Move so vertex 0 lands on `position`
    pub fn set_position(&mut self, position: Point) {
        let offset = position - self.vertices[0];
        self.translate(offset);
    }

    /// Rotate around the centroid.
    pub fn rotate(&mut self, angle: f32) {
        let pivot = self.centroid;
        self.rotate_about(angle, pivot);
    }

    pub fn rotate_about(&mut self, angle: f32, pivot: Point) {
        for v in &mut self.vertices {
            *v = v.rotate_about(pivot, angle);
        }
        self.update_edges();
    }

    pub fn set_vertices(&mut self, vertices: Vec<Point>) -> Result<(), GeometryError> {
        Self::validate(&vertices)?;
        self.vertices = vertices;
        self.update_edges();
        Ok(())
    }

    pub fn sides(&self) -> impl Iterator<Item = Line> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| Line::new(self.vertices[i], self.vertices[(i + 1) % n]))
    }

    fn crosses_segment(&self, a: Point, b: Point) -> bool {
        self.sides().any(|side| edge_intersect_point(side.a, side.b, a, b).is_some())
    }

    /// Exact overlap test that also works for concave polygons: either an
    /// edge pair crosses, or one polygon has a vertex inside the other.
    pub fn intersects_polygon(&self, other: &Polygon) -> bool {
        if !self.aabb.intersects(&other.aabb) {
            return false;
        }
        if other.sides().any(|side| self.crosses_segment(side.a, side.b)) {
            return true;
        }
        self.contains(other.vertices[0]) || other.contains(self.vertices[0])
    }

    pub fn intersects_circle(&self, circle: &Circle) -> bool {
        if !circle.intersects_rect(&self.aabb) {
            return false;
        }
        if self.contains(circle.center()) {
            return true;
        }
        self.sides()
            .any(|side| distance_to_line(circle.center(), side.a, side.b) <= circle.radius())
    }

    pub fn intersects_line(&self, line: &Line) -> bool {
        self.contains(line.a) || self.contains(line.b) || self.crosses_segment(line.a, line.b)
    }
}

impl Shape for Polygon {
    // Even-odd ray cast; correct for concave polygons too
    fn contains(&self, point: Point) -> bool {
        if !self.aabb.contains_closed(point) {
            return false;
        }
        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let vi = self.vertices[i];
            let vj = self.vertices[j];
            if (vi.y > point.y) != (vj.y > point.y) {
                let x_cross = vj.x + (point.y - vj.y) / (vi.y - vj.y) * (vi.x - vj.x);
                if point.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    fn intersects_rect(&self, rect: &Rect) -> bool {
        self.intersects_polygon(&Polygon::from(*rect))
    }

    fn aabb(&self) -> Rect {
        self.aabb
    }
}

impl From<Rect> for Polygon {
    fn from(rect: Rect) -> Self {
        let mut polygon = Polygon {
            vertices: rect.corners().to_vec(),
            edges: Vec::with_capacity(4),
            centroid: Point::ORIGIN,
            aabb: rect,
        };
        polygon.update_edges();
        polygon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::pt;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    fn square(x: f32, y: f32, size: f32) -> Polygon {
        Polygon::from(Rect::new(x, y, size, size))
    }

    #[test]
    fn fewer_than_three_vertices_is_rejected() {
        assert_eq!(
            Polygon::new(vec![pt(0.0, 0.0), pt(1.0, 0.0)]),
            Err(GeometryError::TooFewVertices(2))
        );
        assert_eq!(
            Polygon::new(vec![pt(0.0, 0.0), pt(f32::NAN, 0.0), pt(1.0, 1.0)]),
            Err(GeometryError::NonFiniteVertex { index: 1 })
        );
    }

    #[test]
    fn caches_follow_translation() {
        let mut p = square(0.0, 0.0, 2.0);
        assert_eq!(p.centroid(), pt(1.0, 1.0));
        p.translate(Vector::new(3.0, -1.0));
        assert_eq!(p.position(), pt(3.0, -1.0));
        assert_eq!(p.centroid(), pt(4.0, 0.0));
        assert_eq!(*p.bounding_box(), Rect::new(3.0, -1.0, 2.0, 2.0));
    }

    #[test]
    fn caches_follow_rotation() {
        let mut p = Polygon::from(Rect::new(0.0, 0.0, 4.0, 2.0));
        p.rotate(FRAC_PI_2);
        let bb = p.bounding_box();
        assert_abs_diff_eq!(bb.w, 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(bb.h, 4.0, epsilon = 1e-5);
        assert_abs_diff_eq!(p.centroid().x, 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(p.centroid().y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn set_position_moves_vertex_zero() {
        let mut p = square(0.0, 0.0, 1.0);
        p.set_position(pt(10.0, 10.0));
        assert_eq!(p.position(), pt(10.0, 10.0));
        assert_eq!(p.bounding_box().max_x(), 11.0);
    }

    #[test]
    fn normals_point_outward_for_either_winding() {
        let ccw = square(0.0, 0.0, 1.0);
        let cw = Polygon::new(ccw.vertices().iter().rev().copied().collect()).unwrap();
        for poly in [&ccw, &cw] {
            let c = poly.centroid();
            for (side, n) in poly.sides().zip(poly.normals()) {
                assert!((side.midpoint() - c).dot(n) > 0.0);
            }
        }
    }

    #[test]
    fn zero_length_edges_produce_no_normal() {
        let p = Polygon::new(vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 0.0), pt(0.0, 1.0)]).unwrap();
        assert_eq!(p.edges().len(), 4);
        assert_eq!(p.normals().count(), 3);
    }

    #[test]
    fn contains_handles_concave_shapes() {
        // A "C" shape opening to the right
        let c = Polygon::new(vec![
            pt(0.0, 0.0),
            pt(3.0, 0.0),
            pt(3.0, 1.0),
            pt(1.0, 1.0),
            pt(1.0, 2.0),
            pt(3.0, 2.0),
            pt(3.0, 3.0),
            pt(0.0, 3.0),
        ])
        .unwrap();
        assert!(c.contains(pt(0.5, 1.5)));
        assert!(c.contains(pt(2.0, 0.5)));
        assert!(!c.contains(pt(2.0, 1.5)));
        assert!(!c.contains(pt(5.0, 1.5)));
    }

    #[test]
    fn polygon_intersections() {
        let a = square(0.0, 0.0, 2.0);
        assert!(a.intersects_polygon(&square(1.0, 1.0, 2.0)));
        assert!(a.intersects_polygon(&square(0.5, 0.5, 0.5)));
        assert!(!a.intersects_polygon(&square(3.0, 3.0, 1.0)));

        assert!(a.intersects_circle(&Circle::new(3.0, 1.0, 1.5)));
        assert!(!a.intersects_circle(&Circle::new(4.0, 1.0, 1.5)));

        assert!(a.intersects_line(&Line::new(pt(-1.0, 1.0), pt(3.0, 1.0))));
        assert!(!a.intersects_line(&Line::new(pt(-1.0, 3.0), pt(3.0, 3.0))));
    }

    #[test]
    fn signed_area_tracks_winding() {
        let ccw = square(0.0, 0.0, 2.0);
        assert_abs_diff_eq!(ccw.signed_area(), 4.0);
        let cw = Polygon::new(ccw.vertices().iter().rev().copied().collect()).unwrap();
        assert_abs_diff_eq!(cw.signed_area(), -4.0);
        assert!(!cw.is_counter_clockwise());
    }
}
