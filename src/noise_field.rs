/*
 * Noise Field Module
 *
 * Particles advected through a Perlin flow field. The field angle at a point
 * comes from 3D noise sampled at (x, y, t), so the flow slowly evolves as t
 * advances each step. Particles leaving the field wrap to the other side.
 */

use std::f32::consts::TAU;

use nannou::noise::{NoiseFn, Perlin, Seedable};
use nannou::prelude::rgba;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::debug::DebugInfo;
use crate::modules::{FrameContext, ModuleKind, SandboxModule};
use crate::params::{NoiseParams, SandboxConfig};
use crate::renderer::WorldDraw;
use crate::shapes::{Line, Rect};
use crate::vector::{pt, Point, Vector};

pub const FIELD_BOUNDS: Rect = Rect::new(-600.0, -400.0, 1200.0, 800.0);

// Spacing of the debug arrows
const FIELD_GRID: f32 = 40.0;

#[derive(Debug, Clone, Copy)]
struct FlowParticle {
    position: Point,
    previous: Point,
}

pub struct NoiseField {
    perlin: Perlin,
    particles: Vec<FlowParticle>,
    time: f64,
    rng: StdRng,
}

impl NoiseField {
    pub fn new(config: &SandboxConfig) -> Self {
        let mut field = Self {
            perlin: Perlin::new(),
            particles: Vec::new(),
            time: 0.0,
            rng: StdRng::seed_from_u64(config.noise.seed as u64),
        };
        field.reset(config);
        field
    }

    /// Direction of the flow at `p`, in radians.
    pub fn flow_angle(&self, p: Point, scale: f32) -> f32 {
        let n = self
            .perlin
            .get([(p.x * scale) as f64, (p.y * scale) as f64, self.time]);
        // Perlin output sits roughly in [-1, 1]; two turns spreads it over every heading
        n as f32 * TAU * 2.0
    }

    pub fn particle_positions(&self) -> impl Iterator<Item = Point> + '_ {
        self.particles.iter().map(|p| p.position)
    }

    fn spawn(&mut self) -> FlowParticle {
        let position = pt(
            self.rng.gen_range(FIELD_BOUNDS.min_x()..FIELD_BOUNDS.max_x()),
            self.rng.gen_range(FIELD_BOUNDS.min_y()..FIELD_BOUNDS.max_y()),
        );
        FlowParticle { position, previous: position }
    }

    fn advance(&mut self, params: &NoiseParams) {
        self.time += params.time_step as f64;
        for i in 0..self.particles.len() {
            let particle = self.particles[i];
            let angle = self.flow_angle(particle.position, params.scale);
            let next = particle.position + Vector::from_angle(angle) * params.speed;

            self.particles[i] = if FIELD_BOUNDS.contains(next) {
                FlowParticle { position: next, previous: particle.position }
            } else {
                // Wrap without drawing a streak across the field
                let wrapped = wrap_into(next, &FIELD_BOUNDS);
                FlowParticle { position: wrapped, previous: wrapped }
            };
        }
    }
}

fn wrap_into(p: Point, bounds: &Rect) -> Point {
    let wrap = |v: f32, min: f32, size: f32| {
        let w = min + (v - min).rem_euclid(size);
        if w >= min + size {
            min
        } else {
            w
        }
    };
    pt(wrap(p.x, bounds.x, bounds.w), wrap(p.y, bounds.y, bounds.h))
}

impl SandboxModule for NoiseField {
    fn kind(&self) -> ModuleKind {
        ModuleKind::NoiseField
    }

    fn reset(&mut self, config: &SandboxConfig) {
        self.perlin = Perlin::new().set_seed(config.noise.seed);
        self.rng = StdRng::seed_from_u64(config.noise.seed as u64);
        self.time = 0.0;
        self.particles.clear();
        for _ in 0..config.noise.particle_count {
            let particle = self.spawn();
            self.particles.push(particle);
        }
    }

    fn update(&mut self, ctx: &FrameContext, debug: &mut DebugInfo) {
        let params = &ctx.config.noise;
        if self.particles.len() != params.particle_count {
            self.reset(ctx.config);
        }
        if !ctx.config.pause_simulation {
            self.advance(params);
        }

        debug.entity_count = self.particles.len();
        debug.visible_entities = self.particles.iter().filter(|p| ctx.view.contains(p.position)).count();
        debug.tree_nodes = 0;
        debug.status = format!("t = {:.2}", self.time);
    }

    fn draw(&self, canvas: &mut WorldDraw, config: &SandboxConfig) {
        canvas.outline_rect(&FIELD_BOUNDS, rgba(0.3, 0.3, 0.3, 1.0), 1.0);

        if config.noise.show_field {
            let columns = (FIELD_BOUNDS.w / FIELD_GRID) as usize;
            let rows = (FIELD_BOUNDS.h / FIELD_GRID) as usize;
            for row in 0..rows {
                for column in 0..columns {
                    let center = pt(
                        FIELD_BOUNDS.x + (column as f32 + 0.5) * FIELD_GRID,
                        FIELD_BOUNDS.y + (row as f32 + 0.5) * FIELD_GRID,
                    );
                    let direction = Vector::from_angle(self.flow_angle(center, config.noise.scale));
                    canvas.arrow(center, center + direction * (FIELD_GRID * 0.4), rgba(0.4, 0.4, 0.8, 0.5), 1.0);
                }
            }
        }

        for particle in &self.particles {
            if particle.previous == particle.position {
                canvas.circle(particle.position, 1.0, rgba(0.9, 0.9, 1.0, 0.6));
            } else {
                canvas.line(&Line::new(particle.previous, particle.position), rgba(0.9, 0.9, 1.0, 0.6), 1.5);
            }
        }
    }
}
