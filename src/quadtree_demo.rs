/*
 * Quadtree Demo Module
 *
 * Drifting points in a bounded box, indexed by a quadtree that is kept up
 * to date incrementally: each moved point is removed at its old position and
 * re-inserted at the new one, so subdivision and collapse can be watched
 * as clusters form and break up.
 *
 * A query shape (circle or rect) follows the mouse and the points it finds
 * are highlighted. Clicking spawns a cluster, Delete removes every point
 * under the query shape, R respawns everything.
 */

use std::collections::HashSet;
use std::f32::consts::TAU;

use log::{debug, warn};
use nannou::prelude::{rgba, Key};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::debug::DebugInfo;
use crate::entity::{EntityId, EntityRef, Identified, Positioned};
use crate::modules::{FrameContext, ModuleKind, SandboxModule};
use crate::params::{QueryShape, QuadtreeParams, SandboxConfig};
use crate::quadtree::{QuadTree, QueryStats};
use crate::renderer::WorldDraw;
use crate::shapes::{Circle, Rect, ShapeKind};
use crate::vector::{pt, Point, Vector};

pub const DEMO_BOUNDS: Rect = Rect::new(-512.0, -384.0, 1024.0, 768.0);

const CLUSTER_SIZE: usize = 25;
const CLUSTER_SPREAD: f32 = 30.0;

#[derive(Debug, Clone, Copy)]
struct Drifter {
    id: EntityId,
    position: Point,
    velocity: Vector,
}

impl Positioned for Drifter {
    fn position(&self) -> Point {
        self.position
    }
}

impl Identified for Drifter {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Drifter {
    fn handle(&self) -> EntityRef {
        EntityRef::new(self.id, self.position)
    }

    // Move one step, bouncing off the walls of `bounds`
    fn drift(&mut self, bounds: &Rect) {
        let mut next = self.position + self.velocity;
        if next.x < bounds.min_x() || next.x >= bounds.max_x() {
            self.velocity.x = -self.velocity.x;
            next.x = self.position.x + self.velocity.x;
        }
        if next.y < bounds.min_y() || next.y >= bounds.max_y() {
            self.velocity.y = -self.velocity.y;
            next.y = self.position.y + self.velocity.y;
        }
        if bounds.contains(next) {
            self.position = next;
        }
    }
}

pub struct QuadtreeDemo {
    points: Vec<Drifter>,
    tree: Option<QuadTree<EntityRef>>,
    query: ShapeKind,
    hits: HashSet<EntityId>,
    stats: QueryStats,
    next_id: EntityId,
    rng: StdRng,
}

impl QuadtreeDemo {
    pub fn new(config: &SandboxConfig) -> Self {
        let mut demo = Self {
            points: Vec::new(),
            tree: None,
            query: Circle::new(0.0, 0.0, config.quadtree.query_size).into(),
            hits: HashSet::new(),
            stats: QueryStats::default(),
            next_id: 0,
            rng: StdRng::from_entropy(),
        };
        demo.reset(config);
        demo
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn tree(&self) -> Option<&QuadTree<EntityRef>> {
        self.tree.as_ref()
    }

    pub fn hits(&self) -> &HashSet<EntityId> {
        &self.hits
    }

    fn spawn(&mut self, center: Point, spread: f32, speed: f32) {
        let offset = Vector::from_angle(self.rng.gen_range(0.0..TAU)) * self.rng.gen_range(0.0..spread);
        let position = DEMO_BOUNDS.clamp_point(center + offset);
        if !DEMO_BOUNDS.contains(position) {
            return;
        }
        let drifter = Drifter {
            id: self.next_id,
            position,
            velocity: Vector::from_angle(self.rng.gen_range(0.0..TAU)) * speed,
        };
        self.next_id += 1;
        if let Some(tree) = &mut self.tree {
            tree.insert(drifter.handle());
        }
        self.points.push(drifter);
    }

    fn spawn_uniform(&mut self, count: usize, speed: f32) {
        for _ in 0..count {
            let center = pt(
                self.rng.gen_range(DEMO_BOUNDS.min_x()..DEMO_BOUNDS.max_x()),
                self.rng.gen_range(DEMO_BOUNDS.min_y()..DEMO_BOUNDS.max_y()),
            );
            self.spawn(center, 0.0, speed);
        }
    }

    fn layout_matches(&self, params: &QuadtreeParams) -> bool {
        self.tree
            .as_ref()
            .is_some_and(|t| t.capacity() == params.capacity && t.max_divisions() == params.max_divisions)
    }

    fn rebuild_tree(&mut self, params: &QuadtreeParams) {
        self.tree = match QuadTree::new(DEMO_BOUNDS, params.capacity, params.max_divisions) {
            Ok(mut tree) => {
                tree.rebuild(self.points.iter().map(Drifter::handle));
                Some(tree)
            }
            Err(err) => {
                warn!("quadtree demo has no tree: {}", err);
                None
            }
        };
    }

    fn query_shape(mouse: Point, params: &QuadtreeParams) -> ShapeKind {
        match params.query_shape {
            QueryShape::Circle => Circle::at(mouse, params.query_size).into(),
            QueryShape::Rect => Rect::from_center(mouse, params.query_size * 2.0, params.query_size * 1.5).into(),
        }
    }

    fn step(&mut self, params: &QuadtreeParams) {
        for drifter in &mut self.points {
            let before = drifter.handle();
            drifter.velocity = drifter.velocity.set_magnitude(params.drift_speed);
            drifter.drift(&DEMO_BOUNDS);
            if drifter.position != before.position {
                if let Some(tree) = &mut self.tree {
                    tree.remove(&before);
                    tree.insert(drifter.handle());
                }
            }
        }
    }

    /// Remove every point the current query shape covers.
    pub fn delete_hits(&mut self) {
        if self.hits.is_empty() {
            return;
        }
        let hits = std::mem::take(&mut self.hits);
        if let Some(tree) = &mut self.tree {
            for drifter in self.points.iter().filter(|d| hits.contains(&d.id)) {
                tree.remove(&drifter.handle());
            }
        }
        self.points.retain(|d| !hits.contains(&d.id));
        debug!("deleted {} points", hits.len());
    }
}

impl SandboxModule for QuadtreeDemo {
    fn kind(&self) -> ModuleKind {
        ModuleKind::QuadtreeDemo
    }

    fn reset(&mut self, config: &SandboxConfig) {
        self.points.clear();
        self.hits.clear();
        self.next_id = 0;
        self.rebuild_tree(&config.quadtree);
        self.spawn_uniform(config.quadtree.demo_points, config.quadtree.drift_speed);
    }

    fn update(&mut self, ctx: &FrameContext, debug: &mut DebugInfo) {
        let params = &ctx.config.quadtree;
        if !self.layout_matches(params) {
            self.rebuild_tree(params);
        }
        if !ctx.config.pause_simulation {
            self.step(params);
        }

        self.query = Self::query_shape(ctx.mouse, params);
        self.stats = QueryStats::default();
        self.hits = match &self.tree {
            Some(tree) => tree
                .query_with_stats(&self.query, &mut self.stats)
                .into_iter()
                .map(|e| e.id)
                .collect(),
            None => HashSet::new(),
        };

        debug.query_stats.merge(&self.stats);
        debug.entity_count = self.points.len();
        debug.visible_entities = self.hits.len();
        if let Some(tree) = &self.tree {
            debug.tree_nodes = tree.node_count();
            debug.tree_depth = tree.max_depth_reached();
        }
        debug.status = format!(
            "{} hits, {} of {} points tested",
            self.hits.len(),
            self.stats.entities_tested,
            self.points.len()
        );
    }

    fn draw(&self, canvas: &mut WorldDraw, config: &SandboxConfig) {
        if config.quadtree.show_nodes {
            if let Some(tree) = &self.tree {
                tree.render(canvas);
            }
        }
        canvas.outline_rect(&DEMO_BOUNDS, rgba(0.6, 0.6, 0.6, 1.0), 2.0);

        for drifter in &self.points {
            let color = if self.hits.contains(&drifter.id) {
                rgba(1.0, 0.8, 0.1, 1.0)
            } else {
                rgba(0.8, 0.8, 0.8, 0.8)
            };
            canvas.circle(drifter.position, 3.0, color);
        }

        let query_color = rgba(0.2, 0.9, 1.0, 0.9);
        match &self.query {
            ShapeKind::Circle(c) => canvas.ring(c.center(), c.radius(), query_color, 2.0),
            ShapeKind::Rect(r) => canvas.outline_rect(r, query_color, 2.0),
            ShapeKind::Polygon(p) => canvas.outline_polygon(p, query_color, 2.0),
            ShapeKind::Line(l) => canvas.line(l, query_color, 2.0),
        }
    }

    fn mouse_pressed(&mut self, world: Point, config: &SandboxConfig) -> bool {
        if !DEMO_BOUNDS.contains(world) {
            return false;
        }
        for _ in 0..CLUSTER_SIZE {
            self.spawn(world, CLUSTER_SPREAD, config.quadtree.drift_speed);
        }
        true
    }

    fn key_pressed(&mut self, key: Key, config: &SandboxConfig) {
        match key {
            Key::Delete | Key::Back => self.delete_hits(),
            Key::R => self.reset(config),
            _ => {}
        }
    }
}
