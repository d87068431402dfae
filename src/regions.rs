//! Threshold-based terrain regions.
//!
//! An older, simpler colouring scheme than the gradient: regions are
//! listed by ascending height threshold and each cell takes the colour of
//! the first region whose threshold it does not exceed.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::tilemap::Tilemap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainRegion {
    pub name: String,
    /// Upper height (inclusive) covered by this region.
    pub height: f32,
    pub color: Color,
}

impl TerrainRegion {
    pub fn new(name: impl Into<String>, height: f32, color: Color) -> Self {
        Self {
            name: name.into(),
            height,
            color,
        }
    }
}

/// A water / sand / grass / rock / snow table.
pub fn default_regions() -> Vec<TerrainRegion> {
    vec![
        TerrainRegion::new("Deep Water", 0.3, Color::from_rgb8([30, 60, 150])),
        TerrainRegion::new("Shallow Water", 0.4, Color::from_rgb8([50, 100, 200])),
        TerrainRegion::new("Sand", 0.45, Color::from_rgb8([210, 200, 130])),
        TerrainRegion::new("Grass", 0.6, Color::from_rgb8([85, 150, 50])),
        TerrainRegion::new("Forest", 0.7, Color::from_rgb8([60, 105, 40])),
        TerrainRegion::new("Rock", 0.9, Color::from_rgb8([100, 80, 70])),
        TerrainRegion::new("Snow", 1.0, Color::WHITE),
    ]
}

/// Region lookup for one height. `None` when `h` is above every threshold.
pub fn region_for_height(regions: &[TerrainRegion], h: f32) -> Option<&TerrainRegion> {
    regions.iter().find(|r| h <= r.height)
}

/// Row-major colour buffer (`y * width + x`). Heights above every region
/// are black.
pub fn region_color_map(field: &Tilemap<f32>, regions: &[TerrainRegion]) -> Vec<Color> {
    field
        .as_slice()
        .iter()
        .map(|&h| region_for_height(regions, h).map_or(Color::BLACK, |r| r.color))
        .collect()
}
