//! Banded terrain generation library
//!
//! Fractal noise height fields, a colour gradient and border registry over
//! the normalized height axis, and a classifier that turns band borders into
//! a passability mask.

pub mod borders;
pub mod classify;
pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod gradient;
pub mod heightmap;
pub mod keys;
pub mod regions;
pub mod tilemap;

pub use borders::{BorderMarker, BorderSet};
pub use classify::{classify, classify_markers, BandClassification, BandSpan, BLOCKED, PASSABLE};
pub use color::Color;
pub use config::{ColorSource, DrawMode, MapConfig};
pub use error::{ConfigError, MapError};
pub use generator::{GeneratedMap, MapGenerator};
pub use gradient::{BlendMode, ColorGradient, ColorKey};
pub use heightmap::{generate_noise_map, try_generate, NoiseParams};
pub use tilemap::Tilemap;
