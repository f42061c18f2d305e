/*
 * Sandbox Modules
 *
 * Every demo in the gallery implements `SandboxModule`. The app owns exactly
 * one active module at a time and swaps it when the UI picks another kind;
 * a swapped-out module is dropped, so modules never share state.
 */

use nannou::event::Key;
use serde::{Deserialize, Serialize};

use crate::debug::DebugInfo;
use crate::params::SandboxConfig;
use crate::renderer::WorldDraw;
use crate::shapes::Rect;
use crate::vector::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    #[default]
    Boids,
    NoiseField,
    FractalTree,
    QuadtreeDemo,
    SatDemo,
    Bird,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 6] = [
        ModuleKind::Boids,
        ModuleKind::NoiseField,
        ModuleKind::FractalTree,
        ModuleKind::QuadtreeDemo,
        ModuleKind::SatDemo,
        ModuleKind::Bird,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ModuleKind::Boids => "Boids",
            ModuleKind::NoiseField => "Noise Field",
            ModuleKind::FractalTree => "Fractal Tree",
            ModuleKind::QuadtreeDemo => "Quadtree",
            ModuleKind::SatDemo => "SAT Collisions",
            ModuleKind::Bird => "Flappy Bird",
        }
    }

    // Cycles through ALL, wrapping at the end
    pub fn next(self) -> ModuleKind {
        let index = Self::ALL.iter().position(|&k| k == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    // Whether mouse drag pans the camera; the interactive demos use the
    // mouse themselves
    pub fn camera_drag(self) -> bool {
        matches!(self, ModuleKind::Boids | ModuleKind::NoiseField | ModuleKind::FractalTree)
    }

    pub fn create(self, config: &SandboxConfig) -> Box<dyn SandboxModule> {
        log::info!("starting module {}", self.label());
        match self {
            ModuleKind::Boids => Box::new(crate::flock::Flock::new(config)),
            ModuleKind::NoiseField => Box::new(crate::noise_field::NoiseField::new(config)),
            ModuleKind::FractalTree => Box::new(crate::fractal_tree::FractalTree::new(config)),
            ModuleKind::QuadtreeDemo => Box::new(crate::quadtree_demo::QuadtreeDemo::new(config)),
            ModuleKind::SatDemo => Box::new(crate::sat_demo::SatDemo::new(config)),
            ModuleKind::Bird => Box::new(crate::bird::BirdGame::new(config)),
        }
    }
}

/// Per-tick input handed to the active module.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub config: &'a SandboxConfig,
    // Cursor in world coordinates
    pub mouse: Point,
    // World-space rectangle currently on screen
    pub view: Rect,
    // Seconds since the app started
    pub time: f32,
}

pub trait SandboxModule {
    fn kind(&self) -> ModuleKind;

    /// Throw away simulation state and start over from `config`.
    fn reset(&mut self, config: &SandboxConfig);

    /// Advance one fixed step.
    fn update(&mut self, ctx: &FrameContext, debug: &mut DebugInfo);

    fn draw(&self, canvas: &mut WorldDraw, config: &SandboxConfig);

    // Returns true when the click was used and should not start a camera drag
    fn mouse_pressed(&mut self, _world: Point, _config: &SandboxConfig) -> bool {
        false
    }

    fn key_pressed(&mut self, _key: Key, _config: &SandboxConfig) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_cycles_through_every_kind() {
        let mut kind = ModuleKind::default();
        let mut seen = Vec::new();
        for _ in 0..ModuleKind::ALL.len() {
            seen.push(kind);
            kind = kind.next();
        }
        assert_eq!(kind, ModuleKind::Boids);
        assert_eq!(seen, ModuleKind::ALL.to_vec());
    }

    #[test]
    fn created_modules_report_their_kind() {
        let config = SandboxConfig::default();
        for kind in ModuleKind::ALL {
            assert_eq!(kind.create(&config).kind(), kind);
        }
    }
}
