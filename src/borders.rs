//! Named border markers splitting the height axis into bands.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::keys::{KeyList, TimeKey};

pub const START_NAME: &str = "Start";
pub const END_NAME: &str = "End";

/// A named position on the [0, 1] height axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BorderMarker {
    pub name: String,
    pub time: f32,
}

impl BorderMarker {
    pub fn new(name: impl Into<String>, time: f32) -> Self {
        Self {
            name: name.into(),
            time,
        }
    }

    pub fn start() -> Self {
        Self::new(START_NAME, 0.0)
    }

    pub fn end() -> Self {
        Self::new(END_NAME, 1.0)
    }
}

impl TimeKey for BorderMarker {
    fn time(&self) -> f32 {
        self.time
    }
}

/// Border markers sorted by time. Unlike the colour gradient this set may
/// be emptied completely.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<BorderMarker>", into = "Vec<BorderMarker>")]
pub struct BorderSet {
    markers: KeyList<BorderMarker>,
}

impl BorderSet {
    pub const MIN_BORDERS: usize = 0;

    /// `Start` at 0 and `End` at 1.
    pub fn new() -> Self {
        let mut set = Self::empty();
        set.reset();
        set
    }

    pub fn empty() -> Self {
        Self {
            markers: KeyList::new(Self::MIN_BORDERS),
        }
    }

    pub fn from_markers(markers: Vec<BorderMarker>) -> Result<Self, ConfigError> {
        Ok(Self {
            markers: KeyList::from_keys(markers, Self::MIN_BORDERS, "border set")?,
        })
    }

    /// Markers at the given times, named `Start`, `Border N`, `End` by
    /// position.
    pub fn from_times(times: &[f32]) -> Result<Self, ConfigError> {
        let last = times.len().saturating_sub(1);
        let markers = times
            .iter()
            .enumerate()
            .map(|(i, &t)| {
                let name = match i {
                    0 if t == 0.0 => START_NAME.to_string(),
                    i if i == last && t == 1.0 => END_NAME.to_string(),
                    i => format!("Border {i}"),
                };
                BorderMarker::new(name, t)
            })
            .collect();
        Self::from_markers(markers)
    }

    /// Insert a marker at its sorted position. Fails for a time off [0, 1].
    pub fn add_border(&mut self, name: impl Into<String>, time: f32) -> Result<usize, ConfigError> {
        self.markers.insert(BorderMarker::new(name, time))
    }

    /// Always removes when `index` is valid, even the last marker.
    pub fn remove_border(&mut self, index: usize) -> Option<BorderMarker> {
        self.markers.remove(index)
    }

    /// Replace a marker's name and time. Returns its new index.
    pub fn update_border(
        &mut self,
        index: usize,
        name: impl Into<String>,
        time: f32,
    ) -> Result<Option<usize>, ConfigError> {
        self.markers.replace(index, BorderMarker::new(name, time))
    }

    pub fn update_border_time(&mut self, index: usize, time: f32) -> Result<Option<usize>, ConfigError> {
        let Some(marker) = self.markers.get(index) else {
            return Ok(None);
        };
        let name = marker.name.clone();
        self.markers.replace(index, BorderMarker::new(name, time))
    }

    pub fn reset(&mut self) {
        self.markers.reset_to([BorderMarker::start(), BorderMarker::end()]);
    }

    /// Gaps between consecutive markers. The first gap runs from 0 to the
    /// first marker rather than from the first marker.
    pub fn border_ranges(&self) -> Vec<f32> {
        let mut previous = 0.0;
        self.markers
            .as_slice()
            .iter()
            .map(|m| {
                let gap = m.time - previous;
                previous = m.time;
                gap
            })
            .collect()
    }

    /// A copy with `Start(0)` prepended and `End(1)` appended when the
    /// endpoints are missing. `self` is left untouched.
    pub fn canonicalized(&self) -> Vec<BorderMarker> {
        canonicalize(self.markers.as_slice())
    }

    pub fn get(&self, index: usize) -> Option<&BorderMarker> {
        self.markers.get(index)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn markers(&self) -> &[BorderMarker] {
        self.markers.as_slice()
    }

    pub fn times(&self) -> Vec<f32> {
        self.markers.as_slice().iter().map(|m| m.time).collect()
    }

    pub fn is_changed(&self) -> bool {
        self.markers.is_changed()
    }

    pub fn take_changed(&mut self) -> bool {
        self.markers.take_changed()
    }
}

/// Copy `markers`, adding `Start(0)` in front unless the first marker is
/// already at 0 and `End(1)` at the back unless the last is already at 1.
/// An empty slice yields exactly `[Start(0), End(1)]`.
pub fn canonicalize(markers: &[BorderMarker]) -> Vec<BorderMarker> {
    let mut out = Vec::with_capacity(markers.len() + 2);
    if markers.first().map_or(true, |m| m.time != 0.0) {
        out.push(BorderMarker::start());
    }
    out.extend_from_slice(markers);
    if out.last().map_or(true, |m| m.time != 1.0) {
        out.push(BorderMarker::end());
    }
    out
}

impl Default for BorderSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<BorderMarker>> for BorderSet {
    type Error = ConfigError;

    fn try_from(markers: Vec<BorderMarker>) -> Result<Self, Self::Error> {
        Self::from_markers(markers)
    }
}

impl From<BorderSet> for Vec<BorderMarker> {
    fn from(set: BorderSet) -> Self {
        set.markers.as_slice().to_vec()
    }
}
