/*
 * Fractal Tree Module
 *
 * Recursive binary tree: each branch spawns two children rotated by
 * +/- branch_angle and scaled by `shrink`. Branches are plain `Line`
 * segments, regenerated every step so the sway animation and UI changes
 * show up immediately.
 */

use std::f32::consts::FRAC_PI_2;

use nannou::prelude::rgba;

use crate::debug::DebugInfo;
use crate::modules::{FrameContext, ModuleKind, SandboxModule};
use crate::params::{SandboxConfig, TreeParams};
use crate::renderer::WorldDraw;
use crate::shapes::Line;
use crate::vector::{Point, Vector};

// Where the trunk starts
const ROOT: Point = Point::new(0.0, -300.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Branch {
    pub line: Line,
    pub depth: u32,
}

/// Generate every branch of a tree rooted at `root` growing straight up.
/// `sway` is added to the split angle at each level, so a time-varying
/// value makes the tree move.
pub fn generate(params: &TreeParams, root: Point, sway: f32) -> Vec<Branch> {
    let mut branches = Vec::with_capacity((1usize << (params.depth + 1).min(20)) - 1);
    // (start, heading, length, depth)
    let mut stack = vec![(root, FRAC_PI_2, params.trunk_length, 0u32)];

    while let Some((start, heading, length, depth)) = stack.pop() {
        let end = start + Vector::from_angle(heading) * length;
        branches.push(Branch { line: Line::new(start, end), depth });

        if depth < params.depth {
            let child_length = length * params.shrink;
            let spread = params.branch_angle + sway;
            stack.push((end, heading + spread, child_length, depth + 1));
            stack.push((end, heading - spread, child_length, depth + 1));
        }
    }
    branches
}

pub struct FractalTree {
    branches: Vec<Branch>,
}

impl FractalTree {
    pub fn new(config: &SandboxConfig) -> Self {
        let mut tree = Self { branches: Vec::new() };
        tree.reset(config);
        tree
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }
}

impl SandboxModule for FractalTree {
    fn kind(&self) -> ModuleKind {
        ModuleKind::FractalTree
    }

    fn reset(&mut self, config: &SandboxConfig) {
        self.branches = generate(&config.tree, ROOT, 0.0);
    }

    fn update(&mut self, ctx: &FrameContext, debug: &mut DebugInfo) {
        let params = &ctx.config.tree;
        let sway = if ctx.config.pause_simulation {
            0.0
        } else {
            params.sway * (ctx.time * 0.8).sin()
        };
        self.branches = generate(params, ROOT, sway);

        debug.entity_count = self.branches.len();
        debug.visible_entities = self
            .branches
            .iter()
            .filter(|b| ctx.view.contains(b.line.a) || ctx.view.contains(b.line.b))
            .count();
        debug.tree_nodes = 0;
        debug.status = format!("{} levels", params.depth + 1);
    }

    fn draw(&self, canvas: &mut WorldDraw, config: &SandboxConfig) {
        let max_depth = config.tree.depth.max(1) as f32;
        for branch in &self.branches {
            let t = branch.depth as f32 / max_depth;
            // Thick brown trunk fading to thin green tips
            let color = rgba(0.55 - 0.35 * t, 0.35 + 0.45 * t, 0.2, 1.0);
            let weight = (1.0 - t) * 6.0 + 1.0;
            canvas.line(&branch.line, color, weight * canvas.zoom());
        }
        canvas.circle(ROOT, 4.0, rgba(0.4, 0.3, 0.2, 1.0));
    }
}
