/*
 * SAT Demo Module
 *
 * A slowly spinning pentagon follows the mouse through a field of fixed
 * shapes. Every step it is tested against each shape with SAT; overlapping
 * shapes light up and the minimum translation vector is drawn from the
 * pentagon's centroid. With resolution on (Space), the pentagon is pushed
 * out along the MTV instead of passing through.
 *
 * One obstacle is concave on purpose. SAT results on it would be wrong, so
 * it falls back to the edge/containment intersection test and is labelled.
 */

use log::warn;
use nannou::prelude::{rgba, Key};

use crate::debug::DebugInfo;
use crate::error::GeometryError;
use crate::modules::{FrameContext, ModuleKind, SandboxModule};
use crate::params::SandboxConfig;
use crate::renderer::WorldDraw;
use crate::sat::{self, SatStats, SeparationResult};
use crate::shapes::{Polygon, Rect};
use crate::vector::{pt, Point, Vector};

const PLAYER_RADIUS: f32 = 50.0;
const PLAYER_SPIN: f32 = 0.01;

struct Obstacle {
    polygon: Polygon,
    concave: bool,
}

impl Obstacle {
    fn new(polygon: Polygon) -> Self {
        let concave = polygon.is_concave();
        Self { polygon, concave }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    Clear,
    // Convex overlap with full separation data
    Overlap(SeparationResult),
    // Concave obstacle: only a yes/no answer
    Touching,
}

fn build_obstacles() -> Vec<Obstacle> {
    let shapes: Vec<Result<Polygon, GeometryError>> = vec![
        Polygon::new(vec![pt(-320.0, 80.0), pt(-180.0, 80.0), pt(-250.0, 200.0)]),
        Ok({
            let mut square = Polygon::from(Rect::from_center(pt(0.0, 160.0), 110.0, 110.0));
            square.rotate(0.35);
            square
        }),
        Polygon::regular(pt(260.0, 130.0), 70.0, 6, 0.0),
        // Chevron, concave at the inner notch
        Polygon::new(vec![
            pt(-300.0, -220.0),
            pt(-200.0, -160.0),
            pt(-100.0, -220.0),
            pt(-100.0, -120.0),
            pt(-200.0, -60.0),
            pt(-300.0, -120.0),
        ]),
        // Big enough to swallow the player
        Ok(Polygon::from(Rect::new(60.0, -280.0, 260.0, 200.0))),
    ];

    shapes
        .into_iter()
        .filter_map(|shape| match shape {
            Ok(polygon) => Some(Obstacle::new(polygon)),
            Err(err) => {
                warn!("skipping SAT demo obstacle: {}", err);
                None
            }
        })
        .collect()
}

fn build_player(at: Point) -> Polygon {
    Polygon::regular(at, PLAYER_RADIUS, 5, 0.0)
        .unwrap_or_else(|_| Polygon::from(Rect::from_center(at, PLAYER_RADIUS, PLAYER_RADIUS)))
}

pub struct SatDemo {
    player: Polygon,
    obstacles: Vec<Obstacle>,
    contacts: Vec<Contact>,
    resolve: bool,
    stats: SatStats,
}

impl SatDemo {
    pub fn new(config: &SandboxConfig) -> Self {
        let mut demo = Self {
            player: build_player(Point::ORIGIN),
            obstacles: Vec::new(),
            contacts: Vec::new(),
            resolve: false,
            stats: SatStats::default(),
        };
        demo.reset(config);
        demo
    }

    pub fn player(&self) -> &Polygon {
        &self.player
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn set_resolve(&mut self, resolve: bool) {
        self.resolve = resolve;
    }

    /// Move the player's centroid to `target` and test it against every
    /// obstacle, pushing it out of convex ones when resolution is on.
    pub fn place_player(&mut self, target: Point) {
        let offset = target - self.player.centroid();
        self.player.translate(offset);

        self.contacts.clear();
        for obstacle in &self.obstacles {
            let contact = if obstacle.concave {
                if self.player.intersects_polygon(&obstacle.polygon) {
                    Contact::Touching
                } else {
                    Contact::Clear
                }
            } else {
                let result = sat::check_polygon_polygon_with_stats(&self.player, &obstacle.polygon, &mut self.stats);
                if result.is_separating {
                    Contact::Clear
                } else {
                    if self.resolve {
                        self.player.translate(result.translation());
                    }
                    Contact::Overlap(result)
                }
            };
            self.contacts.push(contact);
        }
    }
}

impl SandboxModule for SatDemo {
    fn kind(&self) -> ModuleKind {
        ModuleKind::SatDemo
    }

    fn reset(&mut self, _config: &SandboxConfig) {
        self.player = build_player(Point::ORIGIN);
        self.obstacles = build_obstacles();
        self.contacts = vec![Contact::Clear; self.obstacles.len()];
    }

    fn update(&mut self, ctx: &FrameContext, debug: &mut DebugInfo) {
        if !ctx.config.pause_simulation {
            self.player.rotate(PLAYER_SPIN);
        }
        self.stats = SatStats::default();
        self.place_player(ctx.mouse);

        debug.sat_stats.merge(&self.stats);
        debug.entity_count = self.obstacles.len() + 1;
        debug.visible_entities = debug.entity_count;
        debug.tree_nodes = 0;

        let touching = self.contacts.iter().filter(|c| !matches!(c, Contact::Clear)).count();
        let contained = self.contacts.iter().any(|c| matches!(c, Contact::Overlap(r) if r.a_in_b));
        debug.status = format!(
            "{} contacts{}{}",
            touching,
            if contained { ", inside" } else { "" },
            if self.resolve { ", resolving" } else { "" }
        );
    }

    fn draw(&self, canvas: &mut WorldDraw, _config: &SandboxConfig) {
        for (obstacle, contact) in self.obstacles.iter().zip(&self.contacts) {
            let fill = match contact {
                Contact::Clear => rgba(0.25, 0.25, 0.35, 1.0),
                Contact::Overlap(_) => rgba(0.8, 0.25, 0.25, 1.0),
                Contact::Touching => rgba(0.8, 0.5, 0.2, 1.0),
            };
            if obstacle.concave {
                // The fill tessellation assumes convex outlines
                canvas.outline_polygon(&obstacle.polygon, fill, 3.0);
                canvas.text("concave", obstacle.polygon.centroid(), rgba(1.0, 1.0, 1.0, 0.8), 12);
            } else {
                canvas.fill_polygon(&obstacle.polygon, fill);
            }
            canvas.outline_rect(obstacle.polygon.bounding_box(), rgba(0.5, 0.5, 0.5, 0.3), 1.0);
        }

        canvas.outline_polygon(&self.player, rgba(0.3, 0.9, 1.0, 1.0), 2.0);
        canvas.outline_rect(self.player.bounding_box(), rgba(0.3, 0.9, 1.0, 0.3), 1.0);

        let centroid = self.player.centroid();
        for contact in &self.contacts {
            if let Contact::Overlap(result) = contact {
                let push: Vector = result.translation();
                canvas.arrow(centroid, centroid + push, rgba(1.0, 1.0, 0.2, 1.0), 2.0);
            }
        }
    }

    fn key_pressed(&mut self, key: Key, _config: &SandboxConfig) {
        if key == Key::Space {
            self.resolve = !self.resolve;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn demo() -> SatDemo {
        SatDemo::new(&SandboxConfig::default())
    }

    #[test]
    fn the_chevron_is_flagged_concave() {
        let demo = demo();
        assert_eq!(demo.obstacles.len(), 5);
        assert_eq!(demo.obstacles.iter().filter(|o| o.concave).count(), 1);
    }

    #[test]
    fn open_space_has_no_contacts() {
        let mut demo = demo();
        demo.place_player(pt(0.0, -20.0));
        assert!(demo.contacts().iter().all(|c| *c == Contact::Clear));
        assert_relative_eq!(demo.player().centroid().x, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn player_inside_big_rect_is_contained() {
        let mut demo = demo();
        demo.place_player(pt(190.0, -180.0));
        let Contact::Overlap(result) = demo.contacts()[4] else {
            panic!("expected an overlap, got {:?}", demo.contacts()[4]);
        };
        assert!(result.a_in_b);
        assert!(!result.b_in_a);
        assert!(result.overlap_distance > PLAYER_RADIUS);
    }

    #[test]
    fn resolution_pushes_the_player_clear() {
        let mut demo = demo();
        demo.set_resolve(true);
        // Overlapping the hexagon's left edge
        demo.place_player(pt(200.0, 130.0));
        assert!(matches!(demo.contacts()[2], Contact::Overlap(_)));
        let hexagon = &demo.obstacles[2].polygon;
        let after = sat::check_polygon_polygon(demo.player(), hexagon);
        assert!(after.is_separating || after.overlap_distance < 1e-3);
    }

    #[test]
    fn concave_obstacle_uses_plain_intersection() {
        let mut demo = demo();
        demo.place_player(pt(-200.0, -140.0));
        assert_eq!(demo.contacts()[3], Contact::Touching);
    }
}
