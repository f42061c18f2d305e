/*
 * Error Types
 *
 * Construction-time failures for shapes and the spatial index, plus config
 * loading. Runtime edge cases (off-tree entities, empty queries) are not
 * errors and never show up here.
 */

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("vertex {index} has a non-finite coordinate")]
    NonFiniteVertex { index: usize },

    #[error("a circle needs at least 3 segments to become a polygon, got {0}")]
    TooFewSegments(usize),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpatialError {
    #[error("quadtree bounds must have a positive, finite size (w = {w}, h = {h})")]
    InvalidBounds { w: f32, h: f32 },

    #[error("quadtree node capacity must be at least 1")]
    ZeroCapacity,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
