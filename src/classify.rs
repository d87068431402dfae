//! Band membership and blockage classification.
//!
//! Border markers split the height axis into bands `[t_i, t_{i+1}]`. Both
//! ends are closed, so a height sitting exactly on a shared border belongs to
//! both neighbouring bands. A band member whose 4-neighbour is not in the
//! same band lies on that band's perimeter and becomes a blocked cell; every
//! other cell stays passable.
//!
//! Membership of a height is always a contiguous run of band indices, so
//! each cell stores that run as a [`BandSpan`]. A cell is then on some band's
//! perimeter exactly when a neighbour's span does not cover its own, which
//! gives the per-band result in a single pass over the grid.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::borders::{canonicalize, BorderMarker, BorderSet};
use crate::color::Color;
use crate::gradient::ColorGradient;
use crate::keys::check_time;
use crate::tilemap::Tilemap;

pub const BLOCKED: u8 = 0;
pub const PASSABLE: u8 = 1;

/// The bands a cell belongs to: indices `first..end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct BandSpan {
    pub first: usize,
    pub end: usize,
}

impl BandSpan {
    pub const EMPTY: BandSpan = BandSpan { first: 0, end: 0 };

    /// Bands whose closed interval contains `h`, given sorted border times.
    pub fn of_height(times: &[f32], h: f32) -> Self {
        if times.len() < 2 || !h.is_finite() {
            return Self::EMPTY;
        }
        // first band whose upper border is >= h
        let first = times[1..].partition_point(|&t| t < h);
        // one past the last band whose lower border is <= h
        let end = times[..times.len() - 1].partition_point(|&t| t <= h);
        if first < end {
            Self { first, end }
        } else {
            Self::EMPTY
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first >= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.first)
    }

    pub fn contains(&self, band: usize) -> bool {
        (self.first..self.end).contains(&band)
    }

    /// True when every band in `other` is also in `self`.
    pub fn covers(&self, other: &BandSpan) -> bool {
        other.is_empty() || (self.first <= other.first && other.end <= self.end)
    }

    /// Lowest band, if any.
    pub fn primary(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.first)
    }
}

/// Result of classifying a height field against a border list.
#[derive(Clone, Debug)]
pub struct BandClassification {
    /// Borders actually used, with synthetic endpoints added where missing.
    pub borders: Vec<BorderMarker>,
    pub spans: Tilemap<BandSpan>,
    /// `BLOCKED` on band perimeters, `PASSABLE` elsewhere.
    pub blockage: Tilemap<u8>,
}

impl BandClassification {
    pub fn band_count(&self) -> usize {
        self.borders.len().saturating_sub(1)
    }

    /// Closed height interval of `band`.
    pub fn band_bounds(&self, band: usize) -> Option<(f32, f32)> {
        let lower = self.borders.get(band)?;
        let upper = self.borders.get(band + 1)?;
        Some((lower.time, upper.time))
    }

    pub fn is_member(&self, x: usize, y: usize, band: usize) -> bool {
        self.spans.get(x, y).contains(band)
    }

    pub fn is_blocked(&self, x: usize, y: usize) -> bool {
        *self.blockage.get(x, y) == BLOCKED
    }

    pub fn blocked_count(&self) -> usize {
        self.blockage.as_slice().iter().filter(|&&v| v == BLOCKED).count()
    }

    /// One colour per cell, row-major: the gradient sampled at the upper
    /// border of the cell's lowest band. Cells outside every band are black.
    pub fn band_color_map(&self, gradient: &ColorGradient) -> Vec<Color> {
        let band_colors: Vec<Color> = self
            .borders
            .iter()
            .skip(1)
            .map(|upper| gradient.evaluate(upper.time))
            .collect();

        self.spans
            .as_slice()
            .iter()
            .map(|span| span.primary().map_or(Color::BLACK, |b| band_colors[b]))
            .collect()
    }
}

/// Classify `field` against a border registry. The registry is only read.
pub fn classify(field: &Tilemap<f32>, borders: &BorderSet) -> BandClassification {
    classify_markers(field, borders.markers())
}

/// Classify `field` against a marker list. The list is copied, markers off
/// the [0, 1] axis are dropped, and the rest are sorted and given
/// `Start(0)` / `End(1)` endpoints if they lack them.
pub fn classify_markers(field: &Tilemap<f32>, markers: &[BorderMarker]) -> BandClassification {
    let mut usable: Vec<BorderMarker> = markers
        .iter()
        .filter(|m| check_time(m.time).is_ok())
        .cloned()
        .collect();
    if usable.len() < markers.len() {
        warn!(dropped = markers.len() - usable.len(), "ignoring border markers outside [0, 1]");
    }
    usable.sort_by(|a, b| a.time.total_cmp(&b.time));
    let borders = canonicalize(&usable);
    let times: Vec<f32> = borders.iter().map(|m| m.time).collect();

    let spans = band_spans(field, &times);
    let blockage = perimeter_blockage(&spans);

    let classification = BandClassification {
        borders,
        spans,
        blockage,
    };
    debug!(
        bands = classification.band_count(),
        blocked = classification.blocked_count(),
        "classified height field"
    );
    classification
}

/// Band membership of every cell.
pub fn band_spans(field: &Tilemap<f32>, times: &[f32]) -> Tilemap<BandSpan> {
    let mut spans = Tilemap::new_with(field.width, field.height, BandSpan::EMPTY);
    spans
        .as_mut_slice()
        .par_iter_mut()
        .zip(field.as_slice().par_iter())
        .for_each(|(span, &h)| *span = BandSpan::of_height(times, h));
    spans
}

/// Mark every cell that has an in-bounds 4-neighbour outside one of its
/// bands.
pub fn perimeter_blockage(spans: &Tilemap<BandSpan>) -> Tilemap<u8> {
    let width = spans.width;
    let mut blockage = Tilemap::new_with(spans.width, spans.height, PASSABLE);
    if width == 0 {
        return blockage;
    }

    blockage
        .as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                let span = spans.get(x, y);
                if span.is_empty() {
                    continue;
                }
                let on_perimeter = spans
                    .neighbors(x, y)
                    .any(|(nx, ny)| !spans.get(nx, ny).covers(span));
                if on_perimeter {
                    *cell = BLOCKED;
                }
            }
        });

    blockage
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(width: usize, height: usize, values: &[f32]) -> Tilemap<f32> {
        Tilemap::from_vec(width, height, values.to_vec()).unwrap()
    }

    fn markers(times: &[f32]) -> Vec<BorderMarker> {
        times
            .iter()
            .enumerate()
            .map(|(i, &t)| BorderMarker::new(format!("b{i}"), t))
            .collect()
    }

    /// Per-band scan: for each band, flag members with a non-member neighbour.
    fn reference_blockage(field: &Tilemap<f32>, times: &[f32]) -> Tilemap<u8> {
        let mut on_border = Tilemap::new_with(field.width, field.height, false);
        for band in 0..times.len() - 1 {
            let (lo, hi) = (times[band], times[band + 1]);
            let member = field.map(|&h| lo <= h && h <= hi);
            for (x, y, &m) in member.iter() {
                if m && member.neighbors(x, y).any(|(nx, ny)| !*member.get(nx, ny)) {
                    on_border.set(x, y, true);
                }
            }
        }
        on_border.map(|&b| if b { BLOCKED } else { PASSABLE })
    }

    #[test]
    fn test_span_of_height() {
        let times = [0.0, 0.5, 1.0];
        assert_eq!(BandSpan::of_height(&times, 0.0), BandSpan { first: 0, end: 1 });
        assert_eq!(BandSpan::of_height(&times, 0.25), BandSpan { first: 0, end: 1 });
        assert_eq!(BandSpan::of_height(&times, 0.5), BandSpan { first: 0, end: 2 });
        assert_eq!(BandSpan::of_height(&times, 0.75), BandSpan { first: 1, end: 2 });
        assert_eq!(BandSpan::of_height(&times, 1.0), BandSpan { first: 1, end: 2 });
        assert!(BandSpan::of_height(&times, 1.5).is_empty());
        assert!(BandSpan::of_height(&times, -0.1).is_empty());
        assert!(BandSpan::of_height(&times, f32::NAN).is_empty());
    }

    #[test]
    fn test_zero_width_band() {
        let times = [0.0, 0.5, 0.5, 1.0];
        let span = BandSpan::of_height(&times, 0.5);
        assert_eq!(span, BandSpan { first: 0, end: 3 });
        assert_eq!(span.len(), 3);
    }

    #[test]
    fn test_canonicalization_in_result() {
        let f = field(2, 1, &[0.2, 0.8]);
        let result = classify_markers(&f, &markers(&[0.4]));
        assert_eq!(result.borders.first().unwrap().time, 0.0);
        assert_eq!(result.borders.last().unwrap().time, 1.0);
        assert_eq!(result.band_count(), 2);
    }

    #[test]
    fn test_markers_off_the_axis_are_dropped() {
        let f = field(2, 1, &[0.2, 0.8]);
        let result = classify_markers(&f, &markers(&[0.0, 1.0, 1.2, f32::NAN, -0.3, 0.5]));
        let times: Vec<f32> = result.borders.iter().map(|m| m.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
        assert_eq!(result.band_count(), 2);
    }

    #[test]
    fn test_registry_not_mutated() {
        let set = BorderSet::from_times(&[0.3, 0.6]).unwrap();
        let before = set.clone();
        let result = classify(&field(1, 1, &[0.5]), &set);
        assert_eq!(set, before);
        assert_eq!(result.borders.len(), 4);
    }

    #[test]
    fn test_single_band_is_all_passable() {
        let values: Vec<f32> = (0..25).map(|i| i as f32 / 24.0).collect();
        let f = field(5, 5, &values);
        let result = classify(&f, &BorderSet::new());
        assert_eq!(result.blocked_count(), 0);
        assert!(result.blockage.as_slice().iter().all(|&v| v == PASSABLE));
    }

    #[test]
    fn test_two_bands_wall_on_both_sides() {
        // 0.2 | 0.8 split at 0.5: each cell neighbours a non-member
        let f = field(4, 1, &[0.2, 0.2, 0.8, 0.8]);
        let result = classify_markers(&f, &markers(&[0.0, 0.5, 1.0]));
        assert_eq!(result.blockage.as_slice(), &[PASSABLE, BLOCKED, BLOCKED, PASSABLE]);
    }

    #[test]
    fn test_shared_boundary_cell_is_in_both_bands() {
        let f = field(3, 1, &[0.2, 0.5, 0.8]);
        let result = classify_markers(&f, &markers(&[0.0, 0.5, 1.0]));
        assert!(result.is_member(1, 0, 0));
        assert!(result.is_member(1, 0, 1));

        // The 0.5 cell is in band 1 while its left neighbour is not, and in
        // band 0 while its right neighbour is not. The outer cells are fully
        // covered by the middle cell's span.
        assert_eq!(result.blockage.as_slice(), &[PASSABLE, BLOCKED, PASSABLE]);
    }

    #[test]
    fn test_boundary_cell_next_to_same_band() {
        let f = field(3, 1, &[0.2, 0.5, 0.3]);
        let result = classify_markers(&f, &markers(&[0.0, 0.5, 1.0]));
        // middle cell is a band-1 member with no band-1 neighbours
        assert_eq!(result.blockage.as_slice(), &[PASSABLE, BLOCKED, PASSABLE]);
    }

    #[test]
    fn test_grid_edges_are_not_non_members() {
        let f = field(3, 3, &[0.1; 9]);
        let result = classify_markers(&f, &markers(&[0.0, 0.5, 1.0]));
        assert_eq!(result.blocked_count(), 0);
    }

    #[test]
    fn test_cells_outside_all_bands() {
        let f = field(2, 1, &[f32::NAN, 0.3]);
        let result = classify_markers(&f, &markers(&[0.0, 1.0]));
        assert!(!result.is_blocked(0, 0));
        assert!(result.is_blocked(1, 0));
    }

    #[test]
    fn test_matches_per_band_scan() {
        let params = crate::heightmap::NoiseParams {
            width: 40,
            height: 30,
            seed: 77,
            scale: 8.0,
            ..Default::default()
        };
        let f = crate::heightmap::try_generate(&params).unwrap();
        for times in [
            vec![0.0, 1.0],
            vec![0.0, 0.5, 1.0],
            vec![0.0, 0.2, 0.45, 0.45, 0.7, 1.0],
        ] {
            let result = classify_markers(&f, &markers(&times));
            assert_eq!(result.blockage, reference_blockage(&f, &times), "borders {times:?}");
        }
    }

    #[test]
    fn test_band_color_map() {
        let gradient = ColorGradient::new();
        let f = field(3, 1, &[0.1, 0.5, 0.9]);
        let result = classify_markers(&f, &markers(&[0.0, 0.5, 1.0]));
        let colors = result.band_color_map(&gradient);
        assert_eq!(colors, vec![Color::grey(0.5), Color::grey(0.5), Color::BLACK]);
        assert_eq!(result.band_bounds(1), Some((0.5, 1.0)));
        assert_eq!(result.band_bounds(2), None);
    }
}
