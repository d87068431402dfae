/// A bounded 2D grid stored row-major (`y * width + x`).
///
/// Unlike a planetary map this grid does not wrap: cells outside
/// `0..width` x `0..height` simply do not exist.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

/// 4-connected neighbour offsets: up, down, left, right.
pub const NEIGHBOR_OFFSETS_4: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Fill the entire map with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Tilemap<T> {
    /// Wrap an existing row-major buffer. Returns `None` when the length
    /// does not match `width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != width * height {
            return None;
        }
        Some(Self { width, height, data })
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Bounds-checked lookup with signed coordinates.
    pub fn try_get(&self, x: i64, y: i64) -> Option<&T> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(self.get(x as usize, y as usize))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major view of the cells, addressed by `y * width + x`.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// 4-connected neighbours (up, down, left, right).
    /// Cells outside the grid are skipped, never reported.
    pub fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        NEIGHBOR_OFFSETS_4.iter().filter_map(move |&(dx, dy)| {
            let nx = x as i64 + dx as i64;
            let ny = y as i64 + dy as i64;
            if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
                None
            } else {
                Some((nx as usize, ny as usize))
            }
        })
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let width = self.width;
        self.data.iter_mut().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }

    /// Build a new map of the same size by applying `f` to every cell.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Tilemap<U> {
        Tilemap {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl Tilemap<f32> {
    /// Minimum and maximum finite values, or `None` for an empty or
    /// all-NaN map.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        let mut min_h = f32::MAX;
        let mut max_h = f32::MIN;
        let mut seen = false;
        for &h in self.data.iter().filter(|h| h.is_finite()) {
            if h < min_h { min_h = h; }
            if h > max_h { max_h = h; }
            seen = true;
        }
        seen.then_some((min_h, max_h))
    }
}
