//! Error types for map generation.

use thiserror::Error;

/// Invalid generation or registry parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("map dimensions must be at least 1x1, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("octave count must be at least 1, got {0}")]
    InvalidOctaves(u32),
    #[error("noise scale must be finite and positive, got {0}")]
    InvalidScale(f64),
    #[error("lacunarity must be a finite value of at least 1, got {0}")]
    InvalidLacunarity(f64),
    #[error("persistence must be finite, got {0}")]
    InvalidPersistence(f64),
    #[error("noise offset must be finite, got ({x}, {y})")]
    InvalidOffset { x: f64, y: f64 },
    #[error("{kind} needs at least {min} entries, found {found}")]
    TooFewKeys {
        kind: &'static str,
        found: usize,
        min: usize,
    },
    #[error("key time must be a finite value in [0, 1], got {0}")]
    TimeOutOfRange(f32),
}

/// Any failure surfaced by the generation pipeline or its outputs.
#[derive(Error, Debug)]
pub enum MapError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
