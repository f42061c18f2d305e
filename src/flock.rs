/*
 * Flock Module
 *
 * The boids sandbox: a wrapping world full of boids, a quadtree rebuilt
 * after every step, and frustum culling so only boids near the camera are
 * drawn. Perception radii of the first boid and the culling frustum are
 * shown when debug drawing is on.
 */

use log::warn;
use nannou::prelude::{rgba, Key};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::boid::Boid;
use crate::culling;
use crate::debug::DebugInfo;
use crate::entity::EntityRef;
use crate::modules::{FrameContext, ModuleKind, SandboxModule};
use crate::params::SandboxConfig;
use crate::physics;
use crate::quadtree::QuadTree;
use crate::renderer::WorldDraw;
use crate::shapes::Rect;
use crate::BOID_SIZE;

pub struct Flock {
    boids: Vec<Boid>,
    tree: Option<QuadTree<EntityRef>>,
    visible: Vec<usize>,
    visible_area: Rect,
    rng: StdRng,
}

fn world_bounds(world_size: f32) -> Rect {
    let half = world_size / 2.0;
    Rect::new(-half, -half, world_size, world_size)
}

impl Flock {
    pub fn new(config: &SandboxConfig) -> Self {
        let mut flock = Self {
            boids: Vec::with_capacity(config.boids.num_boids),
            tree: None,
            visible: Vec::new(),
            visible_area: Rect::default(),
            rng: StdRng::from_entropy(),
        };
        flock.reset(config);
        flock
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn tree(&self) -> Option<&QuadTree<EntityRef>> {
        self.tree.as_ref()
    }

    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    fn build_tree(config: &SandboxConfig) -> Option<QuadTree<EntityRef>> {
        match QuadTree::new(
            world_bounds(config.world_size),
            config.quadtree.capacity,
            config.quadtree.max_divisions,
        ) {
            Ok(tree) => Some(tree),
            Err(err) => {
                warn!("flock falls back to brute force neighbours: {}", err);
                None
            }
        }
    }

    // Recreate the tree if its layout no longer matches the config
    fn sync_tree(&mut self, config: &SandboxConfig) {
        let stale = match &self.tree {
            Some(tree) => {
                tree.capacity() != config.quadtree.capacity
                    || tree.max_divisions() != config.quadtree.max_divisions
                    || *tree.bounds() != world_bounds(config.world_size)
            }
            None => true,
        };
        if stale {
            self.tree = Self::build_tree(config);
        }
    }

    fn reindex(&mut self) {
        if let Some(tree) = &mut self.tree {
            physics::rebuild_index(tree, &self.boids);
        }
    }

    fn active_tree(&self, config: &SandboxConfig) -> Option<&QuadTree<EntityRef>> {
        self.tree.as_ref().filter(|_| config.boids.enable_quadtree)
    }
}

impl SandboxModule for Flock {
    fn kind(&self) -> ModuleKind {
        ModuleKind::Boids
    }

    fn reset(&mut self, config: &SandboxConfig) {
        physics::reset_boids(&mut self.boids, &config.boids, config.world_size, &mut self.rng);
        // Positions may be outside a shrunken world
        for boid in &mut self.boids {
            boid.wrap_edges(config.world_size);
        }
        self.sync_tree(config);
        self.reindex();
    }

    fn update(&mut self, ctx: &FrameContext, debug: &mut DebugInfo) {
        let config = ctx.config;
        if self.boids.len() != config.boids.num_boids {
            self.reset(config);
        }
        self.sync_tree(config);

        if !config.pause_simulation {
            let tree = self.tree.as_ref().filter(|_| config.boids.enable_quadtree);
            physics::step_flock(&mut self.boids, tree, &config.boids, config.world_size, debug);
            self.reindex();
        }

        // Margin so boids straddling the edge are still drawn
        let margin = BOID_SIZE * 2.0;
        self.visible_area = ctx.view.expand(margin);
        self.visible = if config.boids.enable_frustum_culling {
            let tree = self.active_tree(config);
            culling::get_visible_boids(&self.boids, tree, &self.visible_area, &mut debug.query_stats)
        } else {
            (0..self.boids.len()).collect()
        };

        debug.entity_count = self.boids.len();
        debug.visible_entities = self.visible.len();
        debug.culling_efficiency = culling::culling_efficiency(self.visible.len(), self.boids.len());
        let world_area = config.world_size * config.world_size;
        debug.frustum_area_ratio = self.visible_area.area() / world_area;
        match &self.tree {
            Some(tree) => {
                debug.tree_nodes = tree.node_count();
                debug.tree_depth = tree.max_depth_reached();
            }
            None => {
                debug.tree_nodes = 0;
                debug.tree_depth = 0;
            }
        }
        debug.status.clear();
    }

    fn draw(&self, canvas: &mut WorldDraw, config: &SandboxConfig) {
        // World boundary
        canvas.outline_rect(&world_bounds(config.world_size), rgba(0.3, 0.3, 0.3, 1.0), 1.0);

        if config.show_debug && config.quadtree.show_nodes {
            if let Some(tree) = &self.tree {
                tree.render(canvas);
            }
        }

        for &i in &self.visible {
            if let Some(boid) = self.boids.get(i) {
                boid.draw(canvas);
            }
        }

        if config.show_debug {
            if config.boids.enable_frustum_culling {
                canvas.outline_rect(&self.visible_area, rgba(1.0, 0.5, 0.0, 0.7), 2.0);
            }

            if let Some(first) = self.boids.first() {
                let p = first.position;
                canvas.ring(p, config.boids.separation_radius, rgba(1.0, 0.0, 0.0, 1.0), 1.0);
                canvas.ring(p, config.boids.alignment_radius, rgba(0.0, 1.0, 0.0, 1.0), 1.0);
                canvas.ring(p, config.boids.cohesion_radius, rgba(0.0, 0.0, 1.0, 1.0), 1.0);
                canvas.arrow(p, p + first.velocity * 5.0, rgba(1.0, 1.0, 0.0, 1.0), 2.0);
            }
        }
    }

    fn key_pressed(&mut self, key: Key, config: &SandboxConfig) {
        if key == Key::R {
            self.boids.clear();
            self.reset(config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::pt;

    fn config(num_boids: usize) -> SandboxConfig {
        let mut config = SandboxConfig::default();
        config.world_size = 1000.0;
        config.boids.num_boids = num_boids;
        config
    }

    fn ctx(config: &SandboxConfig, view: Rect) -> FrameContext<'_> {
        FrameContext {
            config,
            mouse: pt(0.0, 0.0),
            view,
            time: 0.0,
        }
    }

    #[test]
    fn tree_tracks_the_flock_after_each_step() {
        let config = config(300);
        let mut flock = Flock::new(&config);
        let mut debug = DebugInfo::default();
        for _ in 0..3 {
            flock.update(&ctx(&config, Rect::new(-200.0, -200.0, 400.0, 400.0)), &mut debug);
            let tree = flock.tree().unwrap();
            assert_eq!(tree.len(), 300);
            tree.check_invariants().unwrap();
        }
        assert!(debug.tree_nodes > 1);
        assert!(debug.visible_entities <= 300);
    }

    #[test]
    fn visible_boids_are_inside_the_view() {
        let config = config(500);
        let mut flock = Flock::new(&config);
        let view = Rect::new(-100.0, -100.0, 200.0, 200.0);
        flock.update(&ctx(&config, view), &mut DebugInfo::default());
        let area = view.expand(BOID_SIZE * 2.0);
        assert!(flock.visible().iter().all(|&i| area.contains(flock.boids()[i].position)));
    }

    #[test]
    fn population_follows_config() {
        let mut config = config(50);
        let mut flock = Flock::new(&config);
        config.boids.num_boids = 80;
        flock.update(&ctx(&config, Rect::new(0.0, 0.0, 10.0, 10.0)), &mut DebugInfo::default());
        assert_eq!(flock.boids().len(), 80);
    }

    #[test]
    fn changing_tree_layout_rebuilds_the_tree() {
        let mut config = config(100);
        let mut flock = Flock::new(&config);
        config.quadtree.capacity = 2;
        flock.update(&ctx(&config, Rect::new(0.0, 0.0, 10.0, 10.0)), &mut DebugInfo::default());
        assert_eq!(flock.tree().unwrap().capacity(), 2);
    }
}
