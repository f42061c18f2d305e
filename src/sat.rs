/*
 * SAT Collision Module
 *
 * Separating Axis Theorem test between two convex polygons. Produces the
 * separation data consumers need to resolve a collision: whether the shapes
 * overlap, the axis and distance of the smallest push that separates them,
 * and whether either one sits completely inside the other.
 *
 * Broad phase: the polygons' cached bounding boxes are compared first and a
 * miss returns immediately without testing any axis.
 *
 * Concave input is not rejected, but the result is only meaningful for
 * convex polygons. `calculate_is_concave` is provided so callers can check.
 */

use crate::shapes::{Circle, Polygon};
use crate::vector::{Point, Vector};

// Two unit axes closer than this (by cross product) are treated as the same
const AXIS_EPSILON: f32 = 1e-6;

// Turns smaller than this are treated as collinear by the concavity check
const TURN_EPSILON: f32 = 1e-6;

/// Outcome of one collision test.
///
/// When `is_separating` is true nothing else is meaningful. Otherwise
/// `overlap_axis * overlap_distance`, added to polygon A's position, pushes A
/// out of B along the most binding axis that was tested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeparationResult {
    pub is_separating: bool,
    pub overlap_distance: f32,
    pub overlap_axis: Vector,
    pub a_in_b: bool,
    pub b_in_a: bool,
}

impl SeparationResult {
    pub fn separated() -> Self {
        Self {
            is_separating: true,
            overlap_distance: 0.0,
            overlap_axis: Vector::ZERO,
            a_in_b: false,
            b_in_a: false,
        }
    }

    // Minimum translation vector for A; zero when the shapes are apart
    pub fn translation(&self) -> Vector {
        if self.is_separating {
            Vector::ZERO
        } else {
            self.overlap_axis * self.overlap_distance
        }
    }
}

/// Counters for instrumenting the narrow phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SatStats {
    pub checks: usize,
    pub aabb_rejections: usize,
    pub axes_tested: usize,
}

impl SatStats {
    pub fn merge(&mut self, other: &SatStats) {
        self.checks += other.checks;
        self.aabb_rejections += other.aabb_rejections;
        self.axes_tested += other.axes_tested;
    }
}

pub fn check_polygon_polygon(a: &Polygon, b: &Polygon) -> SeparationResult {
    let mut stats = SatStats::default();
    check_polygon_polygon_with_stats(a, b, &mut stats)
}

pub fn check_polygon_polygon_with_stats(a: &Polygon, b: &Polygon, stats: &mut SatStats) -> SeparationResult {
    stats.checks += 1;

    if !a.bounding_box().intersects(b.bounding_box()) {
        stats.aabb_rejections += 1;
        return SeparationResult::separated();
    }

    let axes = unique_axes(a, b);
    let offset = b.position() - a.position();

    let mut result = SeparationResult {
        is_separating: false,
        overlap_distance: f32::MAX,
        overlap_axis: Vector::ZERO,
        a_in_b: true,
        b_in_a: true,
    };

    for axis in axes {
        stats.axes_tested += 1;
        if is_separating_axis(a, b, offset, axis, &mut result) {
            return SeparationResult::separated();
        }
    }

    // Every edge was degenerate, so there was nothing to push along
    if result.overlap_axis == Vector::ZERO {
        result.overlap_distance = 0.0;
    }

    result
}

// Edge normals of both polygons with parallel duplicates removed. Opposite
// directions describe the same axis, so they are merged too.
fn unique_axes(a: &Polygon, b: &Polygon) -> Vec<Vector> {
    let mut axes: Vec<Vector> = Vec::with_capacity(a.edges().len() + b.edges().len());
    for normal in a.normals().chain(b.normals()) {
        if !axes.iter().any(|existing| existing.cross(normal).abs() <= AXIS_EPSILON) {
            axes.push(normal);
        }
    }
    axes
}

// Interval of the polygon on `axis`, measured from `origin`
#[inline]
fn project(polygon: &Polygon, origin: Point, axis: Vector) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in polygon.vertices() {
        let d = (v - origin).dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

// Returns true when `axis` separates the polygons; otherwise folds this
// axis into `result`
fn is_separating_axis(a: &Polygon, b: &Polygon, offset: Vector, axis: Vector, result: &mut SeparationResult) -> bool {
    let (a_min, a_max) = project(a, a.position(), axis);
    let (b_min, b_max) = project(b, b.position(), axis);
    let shift = offset.dot(axis);
    let b_min = b_min + shift;
    let b_max = b_max + shift;

    if a_max < b_min || b_max < a_min {
        return true;
    }

    result.a_in_b &= a_min >= b_min && a_max <= b_max;
    result.b_in_a &= b_min >= a_min && b_max <= a_max;

    // Push A back through B's near side, or forward through its far side,
    // whichever is shorter. When one interval contains the other this picks
    // the nearer boundary.
    let push_back = a_max - b_min;
    let push_forward = b_max - a_min;
    let (distance, direction) = if push_back < push_forward {
        (push_back, -axis)
    } else {
        (push_forward, axis)
    };

    if distance < result.overlap_distance {
        result.overlap_distance = distance;
        result.overlap_axis = direction;
    }

    false
}

/// Circle/circle test with the same result semantics as the polygon test.
pub fn check_circle_circle(a: &Circle, b: &Circle) -> SeparationResult {
    let between = b.center() - a.center();
    let distance = between.length();
    let reach = a.radius() + b.radius();
    if distance > reach {
        return SeparationResult::separated();
    }

    // Concentric circles have no preferred direction
    let axis = between.try_normalize().unwrap_or(Vector::Y);
    SeparationResult {
        is_separating: false,
        overlap_distance: reach - distance,
        overlap_axis: -axis,
        a_in_b: a.radius() <= b.radius() && distance + a.radius() <= b.radius(),
        b_in_a: b.radius() <= a.radius() && distance + b.radius() <= a.radius(),
    }
}

/// True when the polygon turns both ways somewhere along its boundary,
/// meaning some interior angle is larger than a straight angle.
pub fn calculate_is_concave(polygon: &Polygon) -> bool {
    let v = polygon.vertices();
    let n = v.len();
    if n <= 3 {
        return false;
    }

    let mut winding = 0.0_f32;
    for i in 0..n {
        let (a, b, c) = (v[i], v[(i + 1) % n], v[(i + 2) % n]);
        let turn = (b - a).cross(c - b);
        if turn.abs() <= TURN_EPSILON {
            continue;
        }
        if winding == 0.0 {
            winding = turn.signum();
        } else if turn.signum() != winding {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Rect;
    use crate::vector::pt;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_4;

    fn unit_square(x: f32, y: f32) -> Polygon {
        Polygon::from(Rect::new(x, y, 1.0, 1.0))
    }

    #[test]
    fn distant_squares_are_separated() {
        let result = check_polygon_polygon(&unit_square(0.0, 0.0), &unit_square(2.0, 2.0));
        assert!(result.is_separating);
        assert_eq!(result.translation(), Vector::ZERO);
    }

    #[test]
    fn overlapping_squares_push_horizontally() {
        let result = check_polygon_polygon(&unit_square(0.0, 0.0), &unit_square(0.5, 0.0));
        assert!(!result.is_separating);
        assert_abs_diff_eq!(result.overlap_distance, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(result.overlap_axis.x.abs(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.overlap_axis.y, 0.0, epsilon = 1e-6);
        // A is on the left, so it is pushed further left
        assert!(result.overlap_axis.x < 0.0);
        assert!(!result.a_in_b && !result.b_in_a);
    }

    #[test]
    fn applying_the_translation_resolves_the_overlap() {
        let mut a = Polygon::regular(pt(0.0, 0.0), 1.0, 6, 0.3).unwrap();
        let b = Polygon::regular(pt(1.2, 0.4), 1.0, 5, 0.0).unwrap();
        let result = check_polygon_polygon(&a, &b);
        assert!(!result.is_separating);

        // Nudge a hair past the boundary so touching doesn't count
        a.translate(result.translation() * 1.001);
        assert!(check_polygon_polygon(&a, &b).is_separating);
    }

    #[test]
    fn contained_square_exits_through_nearest_side() {
        let small = Polygon::from(Rect::new(4.0, 1.0, 2.0, 2.0));
        let big = Polygon::from(Rect::new(0.0, 0.0, 10.0, 10.0));

        let result = check_polygon_polygon(&small, &big);
        assert!(!result.is_separating);
        assert!(result.a_in_b);
        assert!(!result.b_in_a);
        assert!(result.overlap_distance.is_finite());
        // The bottom edge is 1 away, and the square is 2 tall
        assert_abs_diff_eq!(result.overlap_distance, 3.0, epsilon = 1e-5);
        assert_abs_diff_eq!(result.overlap_axis.y, -1.0, epsilon = 1e-6);

        let reversed = check_polygon_polygon(&big, &small);
        assert!(reversed.b_in_a);
        assert!(!reversed.a_in_b);
        assert_abs_diff_eq!(reversed.overlap_distance, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn aabb_miss_skips_axis_tests() {
        let mut stats = SatStats::default();
        let a = Polygon::regular(pt(0.0, 0.0), 1.0, 8, 0.0).unwrap();
        let b = Polygon::regular(pt(5.0, 5.0), 1.0, 8, 0.0).unwrap();
        let result = check_polygon_polygon_with_stats(&a, &b, &mut stats);
        assert!(result.is_separating);
        assert_eq!(stats.checks, 1);
        assert_eq!(stats.aabb_rejections, 1);
        assert_eq!(stats.axes_tested, 0);
    }

    #[test]
    fn parallel_axes_are_tested_once() {
        let mut stats = SatStats::default();
        check_polygon_polygon_with_stats(&unit_square(0.0, 0.0), &unit_square(0.5, 0.5), &mut stats);
        // Two squares share the same two axis directions
        assert_eq!(stats.axes_tested, 2);
    }

    #[test]
    fn rotated_square_near_corner() {
        // Diamond whose AABB overlaps the square but whose edges do not
        let square = unit_square(0.0, 0.0);
        let mut diamond = unit_square(1.0, 1.0);
        diamond.rotate(FRAC_PI_4);
        assert!(square.bounding_box().intersects(diamond.bounding_box()));
        assert!(check_polygon_polygon(&square, &diamond).is_separating);
    }

    #[test]
    fn circle_overlap() {
        let a = Circle::new(0.0, 0.0, 1.0);
        let b = Circle::new(1.5, 0.0, 1.0);
        let result = check_circle_circle(&a, &b);
        assert!(!result.is_separating);
        assert_abs_diff_eq!(result.overlap_distance, 0.5, epsilon = 1e-6);
        assert_eq!(result.overlap_axis, Vector::new(-1.0, 0.0));
        assert!(check_circle_circle(&a, &Circle::new(3.0, 0.0, 1.0)).is_separating);

        let inner = Circle::new(0.2, 0.0, 0.5);
        let contained = check_circle_circle(&inner, &Circle::new(0.0, 0.0, 2.0));
        assert!(contained.a_in_b && !contained.b_in_a);
    }

    #[test]
    fn concavity() {
        let arrow = Polygon::new(vec![pt(0.0, 0.0), pt(2.0, 1.0), pt(0.0, 2.0), pt(0.5, 1.0)]).unwrap();
        assert!(calculate_is_concave(&arrow));
        assert!(!calculate_is_concave(&unit_square(0.0, 0.0)));
        let triangle = Polygon::new(vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, 1.0)]).unwrap();
        assert!(!calculate_is_concave(&triangle));
        // Clockwise convex polygons are still convex
        let cw = Polygon::new(unit_square(0.0, 0.0).vertices().iter().rev().copied().collect()).unwrap();
        assert!(!calculate_is_concave(&cw));
        // A collinear vertex does not make a shape concave
        let with_midpoint = Polygon::new(vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(2.0, 0.0), pt(2.0, 2.0), pt(0.0, 2.0)]).unwrap();
        assert!(!calculate_is_concave(&with_midpoint));
    }
}
