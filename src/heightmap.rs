//! Fractal noise height field generation.
//!
//! Every cell sums `octaves` layers of Perlin noise. Each layer samples at a
//! seeded offset so that layers are decorrelated but reproducible. The raw
//! sums are then remapped into [0, 1] using the global min and max.

use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::color::inverse_lerp_f64;
use crate::error::ConfigError;
use crate::tilemap::Tilemap;

/// Permutation seed of the Perlin primitive. Fixed so that only the octave
/// offsets depend on the user seed.
pub const PERLIN_SEED: u32 = 0;

/// Octave offsets are drawn from `-OFFSET_RANGE..OFFSET_RANGE`.
pub const OFFSET_RANGE: i32 = 100_000;

/// Replacement for a non-positive scale.
pub const MIN_SCALE: f64 = 1e-4;

/// Parameters for a fractal noise height field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    /// Larger values zoom in (lower effective frequency).
    pub scale: f64,
    pub octaves: u32,
    /// Amplitude multiplier per octave.
    pub persistence: f64,
    /// Frequency multiplier per octave.
    pub lacunarity: f64,
    /// Added to every octave's sampling offset.
    pub offset: (f64, f64),
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            seed: 0,
            scale: 25.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: (0.0, 0.0),
        }
    }
}

impl NoiseParams {
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Reject parameters the generator would otherwise have to alter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 1 || self.height < 1 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.octaves < 1 {
            return Err(ConfigError::InvalidOctaves(self.octaves));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConfigError::InvalidScale(self.scale));
        }
        if !self.lacunarity.is_finite() || self.lacunarity < 1.0 {
            return Err(ConfigError::InvalidLacunarity(self.lacunarity));
        }
        if !self.persistence.is_finite() {
            return Err(ConfigError::InvalidPersistence(self.persistence));
        }
        let (x, y) = self.offset;
        if !x.is_finite() || !y.is_finite() {
            return Err(ConfigError::InvalidOffset { x, y });
        }
        Ok(())
    }

    /// Copy with every out-of-range value pulled to the nearest valid one:
    /// dimensions, octaves and lacunarity to at least 1, a non-positive or
    /// non-finite scale to [`MIN_SCALE`], a non-finite persistence to the
    /// default and a non-finite offset component to 0.
    pub fn clamped(&self) -> Self {
        let mut p = self.clone();
        if p.width < 1 || p.height < 1 {
            warn!(width = p.width, height = p.height, "clamping map dimensions to at least 1");
            p.width = p.width.max(1);
            p.height = p.height.max(1);
        }
        if p.octaves < 1 {
            warn!("clamping octaves to 1");
            p.octaves = 1;
        }
        if !p.lacunarity.is_finite() || p.lacunarity < 1.0 {
            warn!(lacunarity = p.lacunarity, "clamping lacunarity to 1");
            p.lacunarity = 1.0;
        }
        if !p.scale.is_finite() || p.scale <= 0.0 {
            warn!(scale = p.scale, "replacing invalid scale with {}", MIN_SCALE);
            p.scale = MIN_SCALE;
        }
        if !p.persistence.is_finite() {
            let fallback = Self::default().persistence;
            warn!(persistence = p.persistence, "replacing non-finite persistence with {}", fallback);
            p.persistence = fallback;
        }
        if !p.offset.0.is_finite() || !p.offset.1.is_finite() {
            warn!(x = p.offset.0, y = p.offset.1, "zeroing non-finite noise offset");
            let keep = |v: f64| if v.is_finite() { v } else { 0.0 };
            p.offset = (keep(p.offset.0), keep(p.offset.1));
        }
        p
    }
}

/// Generate a normalized height field, clamping invalid parameters.
#[allow(clippy::too_many_arguments)]
pub fn generate_noise_map(
    width: usize,
    height: usize,
    seed: u64,
    scale: f64,
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
    offset: (f64, f64),
) -> Tilemap<f32> {
    let params = NoiseParams {
        width,
        height,
        seed,
        scale,
        octaves,
        persistence,
        lacunarity,
        offset,
    };
    generate_clamped(&params)
}

/// [`generate_noise_map`] taking a parameter struct.
pub fn generate_clamped(params: &NoiseParams) -> Tilemap<f32> {
    generate_validated(&params.clamped())
}

/// Generate a normalized height field, failing on invalid parameters.
pub fn try_generate(params: &NoiseParams) -> Result<Tilemap<f32>, ConfigError> {
    params.validate()?;
    Ok(generate_validated(params))
}

/// Per-octave sampling offsets: uniform integers in
/// `-OFFSET_RANGE..OFFSET_RANGE` plus the global offset, x drawn before y.
pub fn octave_offsets(seed: u64, octaves: u32, offset: (f64, f64)) -> Vec<(f64, f64)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..octaves)
        .map(|_| {
            let ox = rng.gen_range(-OFFSET_RANGE..OFFSET_RANGE) as f64 + offset.0;
            let oy = rng.gen_range(-OFFSET_RANGE..OFFSET_RANGE) as f64 + offset.1;
            (ox, oy)
        })
        .collect()
}

fn generate_validated(params: &NoiseParams) -> Tilemap<f32> {
    let width = params.width;
    let height = params.height;
    let perlin = Perlin::new(PERLIN_SEED);
    let offsets = octave_offsets(params.seed, params.octaves, params.offset);

    let half_width = width as f64 / 2.0;
    let half_height = height as f64 / 2.0;

    // First pass: raw fractal sums
    let mut raw = vec![0.0f64; width * height];
    raw.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, cell) in row.iter_mut().enumerate() {
            let mut amplitude = 1.0;
            let mut frequency = 1.0;
            let mut total = 0.0;
            for &(ox, oy) in &offsets {
                let sample_x = (x as f64 - half_width) / params.scale * frequency + ox;
                let sample_y = (y as f64 - half_height) / params.scale * frequency + oy;
                let value = perlin.get([sample_x, sample_y]).clamp(-1.0, 1.0);
                total += value * amplitude;

                amplitude *= params.persistence;
                frequency *= params.lacunarity;
            }
            *cell = total;
        }
    });

    // Huge finite persistence can still overflow a sum; such cells pin to
    // the nearest end of the range instead of widening it.
    let (mut min_noise, mut max_noise) = raw
        .par_iter()
        .filter(|h| h.is_finite())
        .map(|&h| (h, h))
        .reduce(
            || (f64::INFINITY, f64::NEG_INFINITY),
            |a, b| (a.0.min(b.0), a.1.max(b.1)),
        );
    if min_noise > max_noise {
        min_noise = 0.0;
        max_noise = 0.0;
    }
    debug!(width, height, octaves = params.octaves, min_noise, max_noise, "sampled noise field");

    // Second pass: global normalization
    let mut field = Tilemap::new_with(width, height, 0.0f32);
    field
        .as_mut_slice()
        .par_iter_mut()
        .zip(raw.par_iter())
        .for_each(|(out, &h)| {
            *out = if h.is_nan() {
                0.0
            } else {
                inverse_lerp_f64(min_noise, max_noise, h) as f32
            };
        });

    field
}
