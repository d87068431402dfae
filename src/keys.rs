//! Ordered key collections over the normalized height axis.
//!
//! Both the colour gradient and the border markers are lists kept sorted
//! ascending by `time`. They share the insertion rule and differ only in
//! the minimum size a removal may leave behind.

use crate::error::ConfigError;

/// Anything positioned on the [0, 1] axis.
pub trait TimeKey {
    fn time(&self) -> f32;
}

/// A list sorted ascending by [`TimeKey::time`] with a dirty flag.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyList<T> {
    keys: Vec<T>,
    min_len: usize,
    changed: bool,
}

impl<T: TimeKey> KeyList<T> {
    /// Empty list that refuses removals below `min_len` entries.
    pub fn new(min_len: usize) -> Self {
        Self {
            keys: Vec::new(),
            min_len,
            changed: false,
        }
    }

    /// Build from persisted keys. Entries are stably re-sorted so equal
    /// times keep their stored order.
    pub fn from_keys(mut keys: Vec<T>, min_len: usize, kind: &'static str) -> Result<Self, ConfigError> {
        if keys.len() < min_len {
            return Err(ConfigError::TooFewKeys {
                kind,
                found: keys.len(),
                min: min_len,
            });
        }
        for key in &keys {
            check_time(key.time())?;
        }
        keys.sort_by(|a, b| a.time().total_cmp(&b.time()));
        Ok(Self {
            keys,
            min_len,
            changed: false,
        })
    }

    /// Insert before the first entry whose time is strictly greater, else
    /// append. Equal times therefore land after the existing entries.
    ///
    /// Times that are not finite or fall outside [0, 1] are rejected and
    /// leave the list untouched.
    pub fn insert(&mut self, key: T) -> Result<usize, ConfigError> {
        check_time(key.time())?;
        Ok(self.insert_sorted(key))
    }

    fn insert_sorted(&mut self, key: T) -> usize {
        let time = key.time();
        let index = self
            .keys
            .iter()
            .position(|k| time < k.time())
            .unwrap_or(self.keys.len());
        self.keys.insert(index, key);
        self.changed = true;
        index
    }

    /// Remove the entry at `index` unless that would leave fewer than the
    /// minimum. A valid index marks the list dirty even when the floor
    /// refuses the removal; an out-of-range index changes nothing.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.keys.len() {
            return None;
        }
        self.changed = true;
        if self.keys.len() <= self.min_len {
            return None;
        }
        Some(self.keys.remove(index))
    }

    /// Take out the entry at `index` and re-insert `key` at its sorted
    /// position. The size floor does not apply since the count is unchanged.
    /// Returns the new index, or `None` for an out-of-range `index`.
    pub fn replace(&mut self, index: usize, key: T) -> Result<Option<usize>, ConfigError> {
        check_time(key.time())?;
        if index >= self.keys.len() {
            return Ok(None);
        }
        self.keys.remove(index);
        Ok(Some(self.insert_sorted(key)))
    }

    /// Mutate an entry without moving it. `f` must not change the time.
    pub(crate) fn modify(&mut self, index: usize, f: impl FnOnce(&mut T)) -> bool {
        match self.keys.get_mut(index) {
            Some(key) => {
                f(key);
                true
            }
            None => false,
        }
    }

    /// Replace the whole list with fixed `keys`, inserted one by one.
    pub(crate) fn reset_to(&mut self, keys: impl IntoIterator<Item = T>) {
        self.keys.clear();
        for key in keys {
            self.insert_sorted(key);
        }
        self.changed = true;
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.keys.get(index)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    pub fn as_slice(&self) -> &[T] {
        &self.keys
    }

    pub fn first(&self) -> Option<&T> {
        self.keys.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.keys.last()
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    /// Read and clear the dirty flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::replace(&mut self.changed, false)
    }

    /// True when every entry's time is >= its predecessor's.
    pub fn is_sorted(&self) -> bool {
        self.keys.windows(2).all(|w| w[0].time() <= w[1].time())
    }
}

/// Accept only finite times on the closed unit interval.
pub fn check_time(time: f32) -> Result<(), ConfigError> {
    if time.is_finite() && (0.0..=1.0).contains(&time) {
        Ok(())
    } else {
        Err(ConfigError::TimeOutOfRange(time))
    }
}
