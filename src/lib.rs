/*
 * Spatial Sandbox - Module Definitions
 *
 * Geometry core (vectors, shapes, SAT, quadtree) plus the interactive
 * modules built on it and the nannou/egui shell that hosts them.
 */

// Re-export key components for easier access
pub use app::Model;
pub use camera::Camera;
pub use debug::DebugInfo;
pub use entity::{Collidable, Emitter, Entity, EntityId, EntityRef, Identified, Positioned};
pub use error::{ConfigError, GeometryError, SpatialError};
pub use modules::{ModuleKind, SandboxModule};
pub use params::SandboxConfig;
pub use quadtree::{QuadTree, QueryStats};
pub use sat::{SatStats, SeparationResult};
pub use shapes::{Circle, Line, Polygon, Rect, Shape, ShapeKind};
pub use vector::{pt, vector, Point, Vector};

// Geometry and spatial core
pub mod entity;
pub mod error;
pub mod math;
pub mod quadtree;
pub mod sat;
pub mod shapes;
pub mod vector;

// Modules
pub mod bird;
pub mod boid;
pub mod culling;
pub mod flock;
pub mod fractal_tree;
pub mod modules;
pub mod noise_field;
pub mod physics;
pub mod quadtree_demo;
pub mod sat_demo;

// Shell
pub mod app;
pub mod camera;
pub mod debug;
pub mod input;
pub mod params;
pub mod renderer;
pub mod ui;

// Constants
pub const BOID_SIZE: f32 = 6.0;
pub const WORLD_SIZE: f32 = 5000.0;
