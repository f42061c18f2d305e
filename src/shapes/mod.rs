/*
 * Shapes Module
 *
 * Circle, Rect, Line and Polygon, unified by the `Shape` trait. The quadtree
 * only needs `contains` and `intersects_rect` from a query shape, so any of
 * these can drive a query. `ShapeKind` is the closed set used where two
 * arbitrary shapes have to be tested against each other.
 */

pub mod circle;
pub mod line;
pub mod polygon;
pub mod rect;

pub use circle::Circle;
pub use line::Line;
pub use polygon::Polygon;
pub use rect::Rect;

use crate::vector::Point;

pub trait Shape {
    fn contains(&self, point: Point) -> bool;

    // Must never return false when the shape contains a point of `rect`
    fn intersects_rect(&self, rect: &Rect) -> bool;

    fn aabb(&self) -> Rect;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Circle(Circle),
    Rect(Rect),
    Polygon(Polygon),
    Line(Line),
}

impl ShapeKind {
    pub fn intersects(&self, other: &ShapeKind) -> bool {
        use ShapeKind as S;
        match (self, other) {
            (S::Circle(a), S::Circle(b)) => a.intersects_circle(b),
            (S::Circle(c), S::Rect(r)) | (S::Rect(r), S::Circle(c)) => c.intersects_rect(r),
            (S::Circle(c), S::Polygon(p)) | (S::Polygon(p), S::Circle(c)) => p.intersects_circle(c),
            (S::Circle(c), S::Line(l)) | (S::Line(l), S::Circle(c)) => l.distance_to(c.center()) <= c.radius(),
            (S::Rect(a), S::Rect(b)) => a.intersects(b),
            (S::Rect(r), S::Polygon(p)) | (S::Polygon(p), S::Rect(r)) => p.intersects_rect(r),
            (S::Rect(r), S::Line(l)) | (S::Line(l), S::Rect(r)) => l.intersects_rect(r),
            (S::Polygon(a), S::Polygon(b)) => a.intersects_polygon(b),
            (S::Polygon(p), S::Line(l)) | (S::Line(l), S::Polygon(p)) => p.intersects_line(l),
            (S::Line(a), S::Line(b)) => a.intersects_line(b),
        }
    }

    fn as_shape(&self) -> &dyn Shape {
        match self {
            ShapeKind::Circle(c) => c,
            ShapeKind::Rect(r) => r,
            ShapeKind::Polygon(p) => p,
            ShapeKind::Line(l) => l,
        }
    }
}

impl Shape for ShapeKind {
    fn contains(&self, point: Point) -> bool {
        self.as_shape().contains(point)
    }

    fn intersects_rect(&self, rect: &Rect) -> bool {
        self.as_shape().intersects_rect(rect)
    }

    fn aabb(&self) -> Rect {
        self.as_shape().aabb()
    }
}

impl From<Circle> for ShapeKind {
    fn from(c: Circle) -> Self {
        ShapeKind::Circle(c)
    }
}

impl From<Rect> for ShapeKind {
    fn from(r: Rect) -> Self {
        ShapeKind::Rect(r)
    }
}

impl From<Polygon> for ShapeKind {
    fn from(p: Polygon) -> Self {
        ShapeKind::Polygon(p)
    }
}

impl From<Line> for ShapeKind {
    fn from(l: Line) -> Self {
        ShapeKind::Line(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::pt;

    #[test]
    fn mixed_pairs_are_symmetric() {
        let shapes: Vec<ShapeKind> = vec![
            Circle::new(0.0, 0.0, 1.0).into(),
            Rect::new(0.5, 0.5, 2.0, 2.0).into(),
            Polygon::from(Rect::new(-0.5, -3.0, 1.0, 2.5)).into(),
            Line::new(pt(-2.0, 0.0), pt(2.0, 0.0)).into(),
        ];
        for a in &shapes {
            for b in &shapes {
                assert_eq!(a.intersects(b), b.intersects(a), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn disjoint_shapes_do_not_intersect() {
        let circle: ShapeKind = Circle::new(0.0, 0.0, 1.0).into();
        let far_rect: ShapeKind = Rect::new(5.0, 5.0, 1.0, 1.0).into();
        let far_line: ShapeKind = Line::new(pt(3.0, -1.0), pt(3.0, 1.0)).into();
        assert!(!circle.intersects(&far_rect));
        assert!(!circle.intersects(&far_line));
        assert!(!far_rect.intersects(&far_line));
    }

    #[test]
    fn shape_kind_delegates_containment() {
        let kind: ShapeKind = Rect::new(0.0, 0.0, 1.0, 1.0).into();
        assert!(kind.contains(pt(0.5, 0.5)));
        assert!(!kind.contains(pt(1.0, 0.5)));
        assert_eq!(kind.aabb(), Rect::new(0.0, 0.0, 1.0, 1.0));
    }
}
