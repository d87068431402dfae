//! Map configuration and its JSON persistence.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::borders::BorderSet;
use crate::error::MapError;
use crate::gradient::ColorGradient;
use crate::heightmap::NoiseParams;
use crate::regions::{default_regions, TerrainRegion};

/// What the main display shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum DrawMode {
    /// Greyscale heights.
    NoiseMap,
    /// The colour buffer.
    #[default]
    ColorMap,
}

/// Where the colour buffer comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum ColorSource {
    /// Continuous gradient evaluation per cell.
    #[default]
    Gradient,
    /// The threshold region table.
    Regions,
    /// One flat colour per band, taken from the gradient at the band's
    /// upper border.
    Bands,
}

/// Everything needed to regenerate a map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub noise: NoiseParams,
    pub gradient: ColorGradient,
    pub borders: BorderSet,
    pub draw_mode: DrawMode,
    pub color_source: ColorSource,
    pub regions: Vec<TerrainRegion>,
    /// Let [`crate::generator::MapGenerator::refresh`] regenerate after
    /// gradient or border edits.
    pub auto_update: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            noise: NoiseParams::default(),
            gradient: ColorGradient::new(),
            borders: BorderSet::new(),
            draw_mode: DrawMode::default(),
            color_source: ColorSource::default(),
            regions: default_regions(),
            auto_update: false,
        }
    }
}

impl MapConfig {
    pub fn from_json(json: &str) -> Result<Self, MapError> {
        let mut config: MapConfig = serde_json::from_str(json)?;
        config.gradient.take_changed();
        config.borders.take_changed();
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, MapError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, MapError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: &Path) -> Result<(), MapError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
