/*
 * Vector Module
 *
 * Point and Vector value types used by every shape and by the spatial index.
 * A Point is a location, a Vector is a direction with a magnitude; moving a
 * Point means adding a Vector to it.
 *
 * Anything that divides by a length handles the zero vector explicitly, so
 * no NaN leaks into geometry.
 */

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use nannou::prelude::Vec2;
use serde::{Deserialize, Serialize};

// Lengths below this are treated as zero when normalizing
pub const EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
}

#[inline]
pub fn pt(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

#[inline]
pub fn vector(x: f32, y: f32) -> Vector {
    Vector::new(x, y)
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        self.distance_squared(other).sqrt()
    }

    #[inline]
    pub fn distance_squared(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    // Vector from the origin to this point
    pub fn to_vector(self) -> Vector {
        Vector::new(self.x, self.y)
    }

    pub fn lerp(self, other: Point, t: f32) -> Point {
        self + (other - self) * t
    }

    pub fn midpoint(self, other: Point) -> Point {
        self.lerp(other, 0.5)
    }

    // Rotate around a pivot by `angle` radians (counter-clockwise)
    pub fn rotate_about(self, pivot: Point, angle: f32) -> Point {
        pivot + (self - pivot).rotate(angle)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Vector {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const X: Self = Self { x: 1.0, y: 0.0 };
    pub const Y: Self = Self { x: 0.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians from the positive x axis.
    pub fn from_angle(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, sin)
    }

    #[inline]
    pub fn dot(self, other: Vector) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// The z component of the 3D cross product of `self` and `other`
    /// (both taken with z = 0). Positive when `other` turns counter-clockwise
    /// from `self`.
    #[inline]
    pub fn cross(self, other: Vector) -> f32 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn is_zero(self) -> bool {
        self.length_squared() <= EPSILON * EPSILON
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    pub fn try_normalize(self) -> Option<Vector> {
        let len = self.length();
        if len <= EPSILON || !len.is_finite() {
            None
        } else {
            Some(self / len)
        }
    }

    pub fn normalize_or_zero(self) -> Vector {
        self.try_normalize().unwrap_or(Vector::ZERO)
    }

    // Scale to the given length; a zero vector stays zero
    pub fn set_magnitude(self, magnitude: f32) -> Vector {
        self.normalize_or_zero() * magnitude
    }

    // Clamp the length to `max`
    pub fn limit(self, max: f32) -> Vector {
        let len_sq = self.length_squared();
        if len_sq > max * max {
            self * (max / len_sq.sqrt())
        } else {
            self
        }
    }

    /// Angle of this vector from the positive x axis, in radians.
    pub fn heading(self) -> f32 {
        self.y.atan2(self.x)
    }

    pub fn rotate(self, angle: f32) -> Vector {
        let (sin, cos) = angle.sin_cos();
        Vector::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    // Counter-clockwise perpendicular
    pub fn perp(self) -> Vector {
        Vector::new(-self.y, self.x)
    }

    /// Unsigned angle between two vectors. Zero when either is a zero vector.
    pub fn angle_between(self, other: Vector) -> f32 {
        let denom = self.length() * other.length();
        if denom <= EPSILON {
            return 0.0;
        }
        (self.dot(other) / denom).clamp(-1.0, 1.0).acos()
    }

    pub fn lerp(self, other: Vector, t: f32) -> Vector {
        self + (other - self) * t
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add<Vector> for Point {
    type Output = Point;
    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign<Vector> for Point {
    fn add_assign(&mut self, rhs: Vector) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub<Vector> for Point {
    type Output = Point;
    fn sub(self, rhs: Vector) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign<Vector> for Point {
    fn sub_assign(&mut self, rhs: Vector) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Sub for Point {
    type Output = Vector;
    fn sub(self, rhs: Point) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector {
    fn sub_assign(&mut self, rhs: Vector) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vector {
    type Output = Vector;
    fn mul(self, rhs: f32) -> Vector {
        Vector::new(self.x * rhs, self.y * rhs)
    }
}

impl MulAssign<f32> for Vector {
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Div<f32> for Vector {
    type Output = Vector;
    fn div(self, rhs: f32) -> Vector {
        Vector::new(self.x / rhs, self.y / rhs)
    }
}

impl DivAssign<f32> for Vector {
    fn div_assign(&mut self, rhs: f32) {
        self.x /= rhs;
        self.y /= rhs;
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}

// Conversions to nannou's vector type for drawing
impl From<Point> for Vec2 {
    fn from(p: Point) -> Vec2 {
        Vec2::new(p.x, p.y)
    }
}

impl From<Vector> for Vec2 {
    fn from(v: Vector) -> Vec2 {
        Vec2::new(v.x, v.y)
    }
}

impl From<Vec2> for Point {
    fn from(v: Vec2) -> Point {
        Point::new(v.x, v.y)
    }
}

impl From<Vec2> for Vector {
    fn from(v: Vec2) -> Vector {
        Vector::new(v.x, v.y)
    }
}
