//! End-to-end map generation: noise, colours and blockage.

use std::time::Instant;

use tracing::{debug, info};

use crate::classify::{classify, BandClassification};
use crate::color::Color;
use crate::config::{ColorSource, DrawMode, MapConfig};
use crate::error::MapError;
use crate::heightmap::try_generate;
use crate::regions::region_color_map;
use crate::tilemap::Tilemap;

/// All outputs of one generation run.
#[derive(Clone, Debug)]
pub struct GeneratedMap {
    pub heights: Tilemap<f32>,
    /// Row-major (`y * width + x`) colour buffer.
    pub colors: Vec<Color>,
    pub classification: BandClassification,
    pub draw_mode: DrawMode,
}

impl GeneratedMap {
    pub fn width(&self) -> usize {
        self.heights.width
    }

    pub fn height(&self) -> usize {
        self.heights.height
    }

    pub fn blockage(&self) -> &Tilemap<u8> {
        &self.classification.blockage
    }

    /// What the main display shows for the current [`DrawMode`].
    pub fn display_colors(&self) -> Vec<Color> {
        match self.draw_mode {
            DrawMode::NoiseMap => self.heights.as_slice().iter().map(|&h| Color::grey(h)).collect(),
            DrawMode::ColorMap => self.colors.clone(),
        }
    }
}

/// Owns a [`MapConfig`] and turns it into maps.
#[derive(Clone, Debug, Default)]
pub struct MapGenerator {
    config: MapConfig,
}

impl MapGenerator {
    pub fn new(config: MapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Mutable access for authoring edits. Gradient and border edits set
    /// their dirty flags, which [`Self::regenerate_if_changed`] observes.
    pub fn config_mut(&mut self) -> &mut MapConfig {
        &mut self.config
    }

    pub fn into_config(self) -> MapConfig {
        self.config
    }

    /// Run the full pipeline. Invalid noise parameters are reported, not
    /// clamped.
    pub fn generate(&self) -> Result<GeneratedMap, MapError> {
        let config = &self.config;
        let start = Instant::now();

        let heights = try_generate(&config.noise)?;
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "noise field ready");

        let classification = classify(&heights, &config.borders);

        let colors = match config.color_source {
            ColorSource::Gradient => heights
                .as_slice()
                .iter()
                .map(|&h| config.gradient.evaluate(h))
                .collect(),
            ColorSource::Regions => region_color_map(&heights, &config.regions),
            ColorSource::Bands => classification.band_color_map(&config.gradient),
        };

        info!(
            width = heights.width,
            height = heights.height,
            seed = config.noise.seed,
            bands = classification.band_count(),
            blocked = classification.blocked_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "generated map"
        );

        Ok(GeneratedMap {
            heights,
            colors,
            classification,
            draw_mode: config.draw_mode,
        })
    }

    /// Regenerate only if the gradient or the borders were edited since the
    /// last call. Both dirty flags are cleared.
    pub fn regenerate_if_changed(&mut self) -> Result<Option<GeneratedMap>, MapError> {
        let gradient_changed = self.config.gradient.take_changed();
        let borders_changed = self.config.borders.take_changed();
        if !(gradient_changed || borders_changed) {
            return Ok(None);
        }
        debug!(gradient_changed, borders_changed, "registry edited, regenerating");
        self.generate().map(Some)
    }

    /// Hook for editors to call after every edit. Does nothing unless
    /// `auto_update` is on, in which case it behaves like
    /// [`Self::regenerate_if_changed`]. Dirty flags survive while it is off.
    pub fn refresh(&mut self) -> Result<Option<GeneratedMap>, MapError> {
        if !self.config.auto_update {
            return Ok(None);
        }
        self.regenerate_if_changed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightmap::NoiseParams;

    fn small_config() -> MapConfig {
        MapConfig {
            noise: NoiseParams {
                width: 24,
                height: 16,
                seed: 3,
                scale: 6.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_outputs_match_size() {
        let map = MapGenerator::new(small_config()).generate().unwrap();
        assert_eq!(map.colors.len(), 24 * 16);
        assert_eq!(map.blockage().len(), 24 * 16);
        assert_eq!(map.display_colors().len(), 24 * 16);
    }

    #[test]
    fn test_gradient_colors_follow_heights() {
        let map = MapGenerator::new(small_config()).generate().unwrap();
        for (i, &h) in map.heights.as_slice().iter().enumerate() {
            assert_eq!(map.colors[i], Color::WHITE.lerp(Color::BLACK, h));
        }
    }

    #[test]
    fn test_noise_map_display_is_greyscale() {
        let mut config = small_config();
        config.draw_mode = DrawMode::NoiseMap;
        let map = MapGenerator::new(config).generate().unwrap();
        let display = map.display_colors();
        assert_eq!(display[5], Color::grey(map.heights.as_slice()[5]));
    }

    #[test]
    fn test_invalid_params_reported() {
        let mut config = small_config();
        config.noise.octaves = 0;
        let err = MapGenerator::new(config).generate().unwrap_err();
        assert!(matches!(err, MapError::Config(_)));
    }

    #[test]
    fn test_regenerate_only_when_dirty() {
        let mut generator = MapGenerator::new(small_config());
        // fresh registries start dirty
        assert!(generator.regenerate_if_changed().unwrap().is_some());
        assert!(generator.regenerate_if_changed().unwrap().is_none());

        generator.config_mut().borders.add_border("mid", 0.5).unwrap();
        let map = generator.regenerate_if_changed().unwrap().unwrap();
        assert_eq!(map.classification.band_count(), 2);
        assert!(map.classification.blocked_count() > 0);
    }

    #[test]
    fn test_refresh_follows_auto_update() {
        let mut generator = MapGenerator::new(small_config());
        generator.regenerate_if_changed().unwrap();

        generator.config_mut().borders.add_border("mid", 0.5).unwrap();
        assert!(generator.refresh().unwrap().is_none());
        assert!(generator.config().borders.is_changed());

        generator.config_mut().auto_update = true;
        let map = generator.refresh().unwrap().unwrap();
        assert_eq!(map.classification.band_count(), 2);
        assert!(generator.refresh().unwrap().is_none());
    }

    #[test]
    fn test_band_color_source() {
        let mut config = small_config();
        config.borders.add_border("mid", 0.5).unwrap();
        config.color_source = ColorSource::Bands;
        let map = MapGenerator::new(config.clone()).generate().unwrap();
        assert_eq!(map.colors, map.classification.band_color_map(&config.gradient));

        // heights span [0, 1], so both bands show up
        assert!(map.colors.contains(&Color::grey(0.5)));
        assert!(map.colors.contains(&Color::BLACK));
        for (i, &h) in map.heights.as_slice().iter().enumerate() {
            let expected = if h <= 0.5 { Color::grey(0.5) } else { Color::BLACK };
            assert_eq!(map.colors[i], expected, "cell {i} height {h}");
        }
    }

    #[test]
    fn test_region_color_source() {
        let mut config = small_config();
        config.color_source = ColorSource::Regions;
        let map = MapGenerator::new(config.clone()).generate().unwrap();
        assert_eq!(map.colors, region_color_map(&map.heights, &config.regions));
    }
}
