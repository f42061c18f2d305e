/*
 * Sandbox Parameters Module
 *
 * SandboxConfig holds every adjustable parameter, one section per module.
 * The UI edits it in place each frame; snapshots taken before the UI runs
 * are compared afterwards to tell the app what needs rebuilding.
 *
 * The whole struct (minus the snapshot) round-trips through TOML, so a
 * `sandbox.toml` next to the binary overrides the defaults.
 */

use std::ops::RangeInclusive;
use std::path::Path;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::modules::ModuleKind;

pub const CONFIG_PATH: &str = "sandbox.toml";

/// File-backed configuration.
pub trait Config: Serialize + DeserializeOwned + Default {
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoidParams {
    pub num_boids: usize,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub separation_radius: f32,
    pub alignment_radius: f32,
    pub cohesion_radius: f32,
    pub max_speed: f32,
    pub max_force: f32,
    // Performance settings
    pub enable_parallel: bool,
    pub enable_quadtree: bool,
    pub enable_frustum_culling: bool,
}

impl Default for BoidParams {
    fn default() -> Self {
        Self {
            num_boids: 500,
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            separation_radius: 25.0,
            alignment_radius: 50.0,
            cohesion_radius: 50.0,
            max_speed: 4.0,
            max_force: 0.1,
            enable_parallel: true,
            enable_quadtree: true,
            enable_frustum_culling: true,
        }
    }
}

impl BoidParams {
    pub fn perception_radius(&self) -> f32 {
        self.separation_radius.max(self.alignment_radius).max(self.cohesion_radius)
    }

    pub fn get_num_boids_range() -> RangeInclusive<usize> {
        10..=20000
    }

    pub fn get_max_speed_range() -> RangeInclusive<f32> {
        1.0..=100.0
    }

    pub fn get_weight_range() -> RangeInclusive<f32> {
        0.0..=3.0
    }

    pub fn get_radius_range() -> RangeInclusive<f32> {
        10.0..=100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryShape {
    #[default]
    Circle,
    Rect,
}

/// Tree layout shared by every module that builds a quadtree, plus the
/// quadtree demo's own settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadtreeParams {
    pub capacity: usize,
    pub max_divisions: u32,
    pub show_nodes: bool,
    pub demo_points: usize,
    pub query_shape: QueryShape,
    pub query_size: f32,
    pub drift_speed: f32,
}

impl Default for QuadtreeParams {
    fn default() -> Self {
        Self {
            capacity: 8,
            max_divisions: 8,
            show_nodes: true,
            demo_points: 400,
            query_shape: QueryShape::Circle,
            query_size: 90.0,
            drift_speed: 0.6,
        }
    }
}

impl QuadtreeParams {
    pub fn get_capacity_range() -> RangeInclusive<usize> {
        1..=64
    }

    pub fn get_max_divisions_range() -> RangeInclusive<u32> {
        0..=12
    }

    pub fn get_demo_points_range() -> RangeInclusive<usize> {
        0..=5000
    }

    pub fn get_query_size_range() -> RangeInclusive<f32> {
        10.0..=300.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BirdParams {
    pub gravity: f32,
    pub flap_strength: f32,
    pub max_fall_speed: f32,
    pub pipe_speed: f32,
    pub pipe_gap: f32,
    pub pipe_spacing: f32,
    pub pipe_width: f32,
    pub show_hitboxes: bool,
}

impl Default for BirdParams {
    fn default() -> Self {
        Self {
            gravity: 0.45,
            flap_strength: 8.0,
            max_fall_speed: 12.0,
            pipe_speed: 3.0,
            pipe_gap: 170.0,
            pipe_spacing: 300.0,
            pipe_width: 70.0,
            show_hitboxes: false,
        }
    }
}

impl BirdParams {
    pub fn get_gravity_range() -> RangeInclusive<f32> {
        0.1..=1.5
    }

    pub fn get_flap_range() -> RangeInclusive<f32> {
        2.0..=20.0
    }

    pub fn get_gap_range() -> RangeInclusive<f32> {
        80.0..=300.0
    }

    pub fn get_pipe_speed_range() -> RangeInclusive<f32> {
        1.0..=10.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub particle_count: usize,
    pub scale: f32,
    pub speed: f32,
    pub time_step: f32,
    pub seed: u32,
    pub show_field: bool,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            particle_count: 1500,
            scale: 0.004,
            speed: 2.0,
            time_step: 0.002,
            seed: 0,
            show_field: false,
        }
    }
}

impl NoiseParams {
    pub fn get_particle_count_range() -> RangeInclusive<usize> {
        0..=10000
    }

    pub fn get_scale_range() -> RangeInclusive<f32> {
        0.0005..=0.02
    }

    pub fn get_speed_range() -> RangeInclusive<f32> {
        0.1..=10.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    pub depth: u32,
    pub trunk_length: f32,
    pub branch_angle: f32,
    pub shrink: f32,
    pub sway: f32,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            depth: 9,
            trunk_length: 160.0,
            branch_angle: 0.45,
            shrink: 0.68,
            sway: 0.08,
        }
    }
}

impl TreeParams {
    pub fn get_depth_range() -> RangeInclusive<u32> {
        0..=14
    }

    pub fn get_angle_range() -> RangeInclusive<f32> {
        0.0..=std::f32::consts::PI
    }

    pub fn get_shrink_range() -> RangeInclusive<f32> {
        0.3..=0.85
    }

    pub fn get_sway_range() -> RangeInclusive<f32> {
        0.0..=0.5
    }
}

// Parameters that invalidate the running module when they change
#[derive(Debug, Clone, PartialEq)]
struct ParamSnapshot {
    active_module: ModuleKind,
    world_size: f32,
    boids: BoidParams,
    quadtree: QuadtreeParams,
    bird: BirdParams,
    noise: NoiseParams,
    tree: TreeParams,
    show_debug: bool,
    pause_simulation: bool,
}

/// What changed between the last snapshot and now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamChanges {
    pub module_changed: bool,
    pub population_changed: bool,
    pub any_changed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub active_module: ModuleKind,
    pub world_size: f32,
    pub fixed_physics_fps: f32,
    pub show_debug: bool,
    pub pause_simulation: bool,
    pub boids: BoidParams,
    pub quadtree: QuadtreeParams,
    pub bird: BirdParams,
    pub noise: NoiseParams,
    pub tree: TreeParams,

    // Internal state for tracking changes
    #[serde(skip)]
    previous_values: Option<Box<ParamSnapshot>>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            active_module: ModuleKind::default(),
            world_size: crate::WORLD_SIZE,
            fixed_physics_fps: 60.0,
            show_debug: false,
            pause_simulation: false,
            boids: BoidParams::default(),
            quadtree: QuadtreeParams::default(),
            bird: BirdParams::default(),
            noise: NoiseParams::default(),
            tree: TreeParams::default(),
            previous_values: None,
        }
    }
}

impl Config for SandboxConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.world_size.is_finite() && self.world_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "world_size",
                reason: format!("must be positive, got {}", self.world_size),
            });
        }
        if !(self.fixed_physics_fps.is_finite() && self.fixed_physics_fps >= 1.0) {
            return Err(ConfigError::Invalid {
                field: "fixed_physics_fps",
                reason: format!("must be at least 1, got {}", self.fixed_physics_fps),
            });
        }
        if self.quadtree.capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "quadtree.capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.bird.pipe_gap <= 0.0 || self.bird.pipe_width <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "bird",
                reason: "pipe gap and width must be positive".to_string(),
            });
        }
        if self.tree.depth > *TreeParams::get_depth_range().end() {
            return Err(ConfigError::Invalid {
                field: "tree.depth",
                reason: format!("at most {} levels", TreeParams::get_depth_range().end()),
            });
        }
        Ok(())
    }
}

impl SandboxConfig {
    /// Load `path` if it exists, otherwise fall back to defaults. A file that
    /// exists but cannot be used is reported and ignored.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("no config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load_from_file(path) {
            Ok(config) => {
                info!("loaded config from {}", path.display());
                config
            }
            Err(err) => {
                warn!("ignoring {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    // Take a snapshot of current parameter values for change detection
    pub fn take_snapshot(&mut self) {
        self.previous_values = Some(Box::new(self.snapshot()));
    }

    fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            active_module: self.active_module,
            world_size: self.world_size,
            boids: self.boids.clone(),
            quadtree: self.quadtree.clone(),
            bird: self.bird.clone(),
            noise: self.noise.clone(),
            tree: self.tree.clone(),
            show_debug: self.show_debug,
            pause_simulation: self.pause_simulation,
        }
    }

    // Check if any parameters have changed since the last snapshot
    pub fn detect_changes(&self) -> ParamChanges {
        // If we don't have previous values, nothing has changed
        let Some(prev) = &self.previous_values else {
            return ParamChanges::default();
        };

        let current = self.snapshot();
        ParamChanges {
            module_changed: current.active_module != prev.active_module,
            population_changed: current.boids.num_boids != prev.boids.num_boids
                || current.world_size != prev.world_size
                || current.quadtree.demo_points != prev.quadtree.demo_points
                || current.noise.particle_count != prev.noise.particle_count
                || current.noise.seed != prev.noise.seed,
            any_changed: current != **prev,
        }
    }

    pub fn get_world_size_range() -> RangeInclusive<f32> {
        500.0..=20000.0
    }

    pub fn get_physics_fps_range() -> RangeInclusive<f32> {
        10.0..=240.0
    }
}
