/*
 * Math Helpers
 *
 * Small scalar and segment helpers shared by the shapes and the demo modules:
 * clamping, range mapping, point-to-segment distance and segment/segment
 * intersection.
 */

use crate::vector::{Point, EPSILON};

#[inline]
pub fn constrain(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

// Re-map a value from one range to another (no clamping)
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let span = in_max - in_min;
    if span.abs() <= EPSILON {
        return out_min;
    }
    out_min + (value - in_min) / span * (out_max - out_min)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Closest point to `p` on the segment `a`-`b`.
pub fn closest_point_on_segment(p: Point, a: Point, b: Point) -> Point {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= EPSILON * EPSILON {
        return a;
    }
    let t = constrain((p - a).dot(ab) / len_sq, 0.0, 1.0);
    a + ab * t
}

/// Shortest distance from `p` to the segment `a`-`b`.
pub fn distance_to_line(p: Point, a: Point, b: Point) -> f32 {
    p.distance(closest_point_on_segment(p, a, b))
}

/// Intersection point of segments `a1`-`a2` and `b1`-`b2`, endpoints included.
///
/// Parallel segments return `None`, including collinear overlapping ones.
pub fn edge_intersect_point(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let r = a2 - a1;
    let s = b2 - b1;
    let denom = r.cross(s);
    if denom.abs() <= EPSILON {
        return None;
    }

    let qp = b1 - a1;
    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a1 + r * t)
    } else {
        None
    }
}
