//! Colour gradient keyed along the normalized height axis.
//!
//! The gradient always holds at least two keys. Evaluation picks the keys
//! either side of the query and blends them according to [`BlendMode`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::{inverse_lerp, Color};
use crate::error::ConfigError;
use crate::keys::{KeyList, TimeKey};

/// How colours between two keys are produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum BlendMode {
    #[default]
    Linear,
    /// Every point takes the colour of the next key at or above it.
    Discrete,
}

impl std::fmt::Display for BlendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Discrete => write!(f, "discrete"),
        }
    }
}

/// A named colour stop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorKey {
    pub color: Color,
    pub time: f32,
    pub name: String,
}

impl ColorKey {
    pub fn new(color: Color, time: f32, name: impl Into<String>) -> Self {
        Self {
            color,
            time,
            name: name.into(),
        }
    }
}

impl TimeKey for ColorKey {
    fn time(&self) -> f32 {
        self.time
    }
}

#[derive(Serialize, Deserialize)]
struct GradientRepr {
    #[serde(default)]
    blend_mode: BlendMode,
    #[serde(default)]
    randomize_color: bool,
    keys: Vec<ColorKey>,
}

/// Sorted colour keys plus blending options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GradientRepr", into = "GradientRepr")]
pub struct ColorGradient {
    pub blend_mode: BlendMode,
    /// New keys get a random colour instead of the colour under the cursor.
    pub randomize_color: bool,
    keys: KeyList<ColorKey>,
}

impl ColorGradient {
    /// A gradient never shrinks below this many keys.
    pub const MIN_KEYS: usize = 2;

    /// White at 0 ("start") to black at 1 ("end").
    pub fn new() -> Self {
        let mut gradient = Self {
            blend_mode: BlendMode::Linear,
            randomize_color: false,
            keys: KeyList::new(Self::MIN_KEYS),
        };
        gradient.reset_keys();
        gradient
    }

    /// Build from stored keys, sorting them. Fails with fewer than
    /// [`Self::MIN_KEYS`] keys or times outside [0, 1].
    pub fn from_keys(keys: Vec<ColorKey>, blend_mode: BlendMode) -> Result<Self, ConfigError> {
        Ok(Self {
            blend_mode,
            randomize_color: false,
            keys: KeyList::from_keys(keys, Self::MIN_KEYS, "colour gradient")?,
        })
    }

    /// Colour at `time`.
    ///
    /// `left` is the last key at or below `time` (the first key if none),
    /// `right` the first key at or above it (the last key if none).
    pub fn evaluate(&self, time: f32) -> Color {
        let keys = self.keys.as_slice();
        let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
            return Color::WHITE;
        };

        let mut left = first;
        let mut right = last;
        for key in keys {
            if key.time <= time {
                left = key;
            }
            if key.time >= time {
                right = key;
                break;
            }
        }

        match self.blend_mode {
            BlendMode::Linear => {
                let t = inverse_lerp(left.time, right.time, time);
                left.color.lerp(right.color, t)
            }
            BlendMode::Discrete => right.color,
        }
    }

    /// `len` evenly spaced samples from time 0 to time 1 inclusive.
    pub fn sample_strip(&self, len: usize) -> Vec<Color> {
        match len {
            0 => Vec::new(),
            1 => vec![self.evaluate(0.0)],
            _ => (0..len)
                .map(|i| self.evaluate(i as f32 / (len - 1) as f32))
                .collect(),
        }
    }

    /// Insert a key at its sorted position. Fails for a time off [0, 1].
    pub fn add_key(&mut self, color: Color, time: f32, name: impl Into<String>) -> Result<usize, ConfigError> {
        self.keys.insert(ColorKey::new(color, time, name))
    }

    /// Colour proposed for a key created at `time`.
    pub fn new_key_color<R: Rng + ?Sized>(&self, time: f32, rng: &mut R) -> Color {
        if self.randomize_color {
            Color::random(rng)
        } else {
            self.evaluate(time)
        }
    }

    /// Add an unnamed key at `time` coloured by [`Self::new_key_color`].
    pub fn add_key_at<R: Rng + ?Sized>(&mut self, time: f32, rng: &mut R) -> Result<usize, ConfigError> {
        let color = self.new_key_color(time, rng);
        self.add_key(color, time, "")
    }

    /// No-op (apart from the dirty flag) when only [`Self::MIN_KEYS`] remain.
    pub fn remove_key(&mut self, index: usize) -> Option<ColorKey> {
        self.keys.remove(index)
    }

    /// Replace every field of a key. Returns the key's new index, or `None`
    /// when `index` is out of range.
    pub fn update_key(
        &mut self,
        index: usize,
        color: Color,
        time: f32,
        name: impl Into<String>,
    ) -> Result<Option<usize>, ConfigError> {
        self.keys.replace(index, ColorKey::new(color, time, name))
    }

    /// Move a key to `time`, keeping its colour and name.
    pub fn update_key_time(&mut self, index: usize, time: f32) -> Result<Option<usize>, ConfigError> {
        let Some(key) = self.keys.get(index) else {
            return Ok(None);
        };
        let moved = ColorKey::new(key.color, time, key.name.clone());
        self.keys.replace(index, moved)
    }

    pub fn update_key_color(&mut self, index: usize, color: Color) -> bool {
        let found = self.keys.modify(index, |key| key.color = color);
        if found {
            self.keys.mark_changed();
        }
        found
    }

    /// Rename a key. Names never affect evaluation, so this leaves the
    /// dirty flag alone.
    pub fn update_key_name(&mut self, index: usize, name: impl Into<String>) -> bool {
        let name = name.into();
        self.keys.modify(index, |key| key.name = name)
    }

    pub fn set_blend_mode(&mut self, blend_mode: BlendMode) {
        self.blend_mode = blend_mode;
        self.keys.mark_changed();
    }

    /// Back to exactly white "start" at 0 and black "end" at 1.
    pub fn reset_keys(&mut self) {
        self.keys.reset_to([
            ColorKey::new(Color::WHITE, 0.0, "start"),
            ColorKey::new(Color::BLACK, 1.0, "end"),
        ]);
    }

    pub fn get(&self, index: usize) -> Option<&ColorKey> {
        self.keys.get(index)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[ColorKey] {
        self.keys.as_slice()
    }

    pub fn is_changed(&self) -> bool {
        self.keys.is_changed()
    }

    pub fn take_changed(&mut self) -> bool {
        self.keys.take_changed()
    }
}

impl Default for ColorGradient {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<GradientRepr> for ColorGradient {
    type Error = ConfigError;

    fn try_from(repr: GradientRepr) -> Result<Self, Self::Error> {
        let mut gradient = Self::from_keys(repr.keys, repr.blend_mode)?;
        gradient.randomize_color = repr.randomize_color;
        Ok(gradient)
    }
}

impl From<ColorGradient> for GradientRepr {
    fn from(gradient: ColorGradient) -> Self {
        Self {
            blend_mode: gradient.blend_mode,
            randomize_color: gradient.randomize_color,
            keys: gradient.keys.as_slice().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    fn rgb_gradient(mode: BlendMode) -> ColorGradient {
        ColorGradient::from_keys(
            vec![
                ColorKey::new(RED, 0.0, "low"),
                ColorKey::new(GREEN, 0.5, "mid"),
                ColorKey::new(BLUE, 1.0, "high"),
            ],
            mode,
        )
        .unwrap()
    }

    #[test]
    fn test_default_keys() {
        let gradient = ColorGradient::new();
        assert_eq!(gradient.len(), 2);
        assert_eq!(gradient.get(0), Some(&ColorKey::new(Color::WHITE, 0.0, "start")));
        assert_eq!(gradient.get(1), Some(&ColorKey::new(Color::BLACK, 1.0, "end")));
        assert_eq!(gradient.get(2), None);
    }

    #[test]
    fn test_evaluate_at_key_times_returns_key_color() {
        let mut gradient = rgb_gradient(BlendMode::Linear);
        gradient.add_key(Color::rgb(0.3, 0.6, 0.9), 0.8, "extra").unwrap();
        for key in gradient.keys().to_vec() {
            assert_eq!(gradient.evaluate(key.time), key.color, "key {}", key.name);
        }
    }

    #[test]
    fn test_linear_blend_midpoint() {
        let gradient = rgb_gradient(BlendMode::Linear);
        let c = gradient.evaluate(0.25);
        assert!((c.r - 0.5).abs() < 1e-6);
        assert!((c.g - 0.5).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn test_discrete_uses_right_key() {
        let gradient = rgb_gradient(BlendMode::Discrete);
        assert_eq!(gradient.evaluate(0.1), GREEN);
        assert_eq!(gradient.evaluate(0.5), GREEN);
        assert_eq!(gradient.evaluate(0.51), BLUE);
        assert_eq!(gradient.evaluate(0.0), RED);
    }

    #[test]
    fn test_evaluate_outside_key_range() {
        let gradient = ColorGradient::from_keys(
            vec![ColorKey::new(RED, 0.2, "a"), ColorKey::new(BLUE, 0.8, "b")],
            BlendMode::Linear,
        )
        .unwrap();
        assert_eq!(gradient.evaluate(0.0), RED);
        assert_eq!(gradient.evaluate(1.0), BLUE);
    }

    #[test]
    fn test_remove_at_minimum_is_noop() {
        let mut gradient = ColorGradient::new();
        assert_eq!(gradient.remove_key(0), None);
        assert_eq!(gradient.len(), 2);

        gradient.add_key(RED, 0.5, "red").unwrap();
        assert!(gradient.remove_key(1).is_some());
        assert_eq!(gradient.len(), 2);
    }

    #[test]
    fn test_update_returns_new_index() {
        let mut gradient = rgb_gradient(BlendMode::Linear);
        assert_eq!(gradient.update_key_time(0, 0.75), Ok(Some(1)));
        assert_eq!(gradient.get(1).unwrap().name, "low");
        assert_eq!(gradient.get(1).unwrap().color, RED);

        assert_eq!(gradient.update_key(2, GREEN, 0.1, "moved"), Ok(Some(0)));
        assert_eq!(gradient.get(0).unwrap().name, "moved");
        assert_eq!(gradient.len(), 3);
    }

    #[test]
    fn test_update_on_two_keys_keeps_both() {
        let mut gradient = ColorGradient::new();
        assert_eq!(gradient.update_key_time(1, 0.5), Ok(Some(1)));
        assert_eq!(gradient.len(), 2);
    }

    #[test]
    fn test_sorted_after_mutations() {
        let mut gradient = ColorGradient::new();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for i in 0..20 {
            let t = ((i * 37) % 100) as f32 / 100.0;
            let idx = gradient.add_key_at(t, &mut rng).unwrap();
            if i % 3 == 0 {
                gradient.update_key_time(idx, 1.0 - t).unwrap();
            }
        }
        assert!(gradient.keys().windows(2).all(|w| w[0].time <= w[1].time));
    }

    #[test]
    fn test_rejects_key_times_off_the_axis() {
        let mut gradient = rgb_gradient(BlendMode::Linear);
        gradient.take_changed();

        assert_eq!(gradient.add_key(RED, 1.2, "over"), Err(ConfigError::TimeOutOfRange(1.2)));
        assert!(gradient.add_key(RED, f32::NAN, "nan").is_err());
        assert!(gradient.update_key(1, RED, -0.5, "mid").is_err());
        assert!(gradient.update_key_time(1, f32::INFINITY).is_err());
        assert_eq!(gradient.update_key_time(9, 0.5), Ok(None));

        assert_eq!(gradient.len(), 3);
        assert_eq!(gradient.get(1).unwrap().name, "mid");
        assert!(!gradient.is_changed());

        let json = serde_json::to_string(&gradient).unwrap();
        let back: ColorGradient = serde_json::from_str(&json).unwrap();
        assert_eq!(back.keys(), gradient.keys());
    }

    #[test]
    fn test_dirty_flag() {
        let mut gradient = ColorGradient::new();
        assert!(gradient.take_changed());
        gradient.update_key_name(0, "bottom");
        assert!(!gradient.is_changed());
        gradient.update_key_color(0, RED);
        assert!(gradient.take_changed());
        gradient.set_blend_mode(BlendMode::Discrete);
        assert!(gradient.is_changed());
    }

    #[test]
    fn test_new_key_color_follows_toggle() {
        let mut gradient = ColorGradient::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(gradient.new_key_color(0.5, &mut rng), Color::grey(0.5));
        gradient.randomize_color = true;
        let c = gradient.new_key_color(0.5, &mut rng);
        assert!((0.0..1.0).contains(&c.r) && (0.0..1.0).contains(&c.g));
    }

    #[test]
    fn test_sample_strip() {
        let gradient = ColorGradient::new();
        let strip = gradient.sample_strip(3);
        assert_eq!(strip, vec![Color::WHITE, Color::grey(0.5), Color::BLACK]);
        assert_eq!(gradient.sample_strip(1), vec![Color::WHITE]);
        assert!(gradient.sample_strip(0).is_empty());
    }

    #[test]
    fn test_serde_keeps_key_tuples() {
        let gradient = rgb_gradient(BlendMode::Discrete);
        let json = serde_json::to_string(&gradient).unwrap();
        let back: ColorGradient = serde_json::from_str(&json).unwrap();
        assert_eq!(back.keys(), gradient.keys());
        assert_eq!(back.blend_mode, BlendMode::Discrete);

        let too_few = r#"{"keys":[{"color":{"r":1.0,"g":1.0,"b":1.0},"time":0.0,"name":"x"}]}"#;
        assert!(serde_json::from_str::<ColorGradient>(too_few).is_err());
    }
}
