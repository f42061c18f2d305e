/*
 * Entity Capabilities
 *
 * Small capability traits that simulation objects implement. The quadtree
 * only ever asks an entity for its position and its id; collision code asks
 * for a hitbox; anything that spawns particles is an Emitter.
 */

use crate::sat::{self, SatStats, SeparationResult};
use crate::shapes::Polygon;
use crate::vector::Point;

pub type EntityId = u64;

pub trait Positioned {
    fn position(&self) -> Point;
}

pub trait Identified {
    fn id(&self) -> EntityId;
}

/// Anything the spatial index can store.
pub trait Entity: Positioned + Identified {}

impl<T: Positioned + Identified> Entity for T {}

pub trait Collidable {
    fn hitbox(&self) -> &Polygon;

    fn separation_from<C: Collidable>(&self, other: &C) -> SeparationResult {
        sat::check_polygon_polygon(self.hitbox(), other.hitbox())
    }

    fn separation_with_stats<C: Collidable>(&self, other: &C, stats: &mut SatStats) -> SeparationResult {
        sat::check_polygon_polygon_with_stats(self.hitbox(), other.hitbox(), stats)
    }

    fn collides_with<C: Collidable>(&self, other: &C) -> bool {
        !self.separation_from(other).is_separating
    }
}

pub trait Emitter {
    type Particle;

    // Push any particles produced this tick into `out`
    fn emit(&mut self, out: &mut Vec<Self::Particle>);
}

/// Lightweight handle for consumers that keep the real state elsewhere
/// (the flock stores its boids in a Vec and indexes them by position only).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityRef {
    pub id: EntityId,
    pub position: Point,
}

impl EntityRef {
    pub fn new(id: EntityId, position: Point) -> Self {
        Self { id, position }
    }
}

impl Positioned for EntityRef {
    fn position(&self) -> Point {
        self.position
    }
}

impl Identified for EntityRef {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl<T: Positioned> Positioned for &T {
    fn position(&self) -> Point {
        (**self).position()
    }
}

impl<T: Identified> Identified for &T {
    fn id(&self) -> EntityId {
        (**self).id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Rect;
    use crate::vector::pt;

    struct Crate {
        hitbox: Polygon,
    }

    impl Collidable for Crate {
        fn hitbox(&self) -> &Polygon {
            &self.hitbox
        }
    }

    #[test]
    fn collidables_use_sat() {
        let a = Crate { hitbox: Polygon::from(Rect::new(0.0, 0.0, 1.0, 1.0)) };
        let b = Crate { hitbox: Polygon::from(Rect::new(0.5, 0.0, 1.0, 1.0)) };
        let c = Crate { hitbox: Polygon::from(Rect::new(3.0, 0.0, 1.0, 1.0)) };
        assert!(a.collides_with(&b));
        assert!(!a.collides_with(&c));

        let mut stats = SatStats::default();
        assert!(a.separation_with_stats(&c, &mut stats).is_separating);
        assert_eq!(stats.aabb_rejections, 1);
    }

    #[test]
    fn entity_ref_exposes_position_and_id() {
        fn describe<E: Entity>(e: &E) -> (EntityId, Point) {
            (e.id(), e.position())
        }
        let e = EntityRef::new(7, pt(1.0, 2.0));
        assert_eq!(describe(&e), (7, pt(1.0, 2.0)));
        assert_eq!(describe(&&e), (7, pt(1.0, 2.0)));
    }
}
