//! Axis selections, clipped ranges, and bounded 3-D iteration.
//!
//! Sparse storage only knows the extent of the data it holds, so every
//! range request is clipped against that extent before iteration. A
//! [`CoordRange`] composes three clipped [`AxisRange`]s and walks the
//! resulting box lazily in axis-major order (x outermost, z innermost).
//! Ranges are plain values: iterating never consumes them, so the same
//! range can be walked any number of times.

// Axis runs resolve from i32 bounds; arithmetic widens to i64 and the
// results narrow back losslessly.
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]

use crate::coord::VoxelCoord;

/// A per-axis selection: one coordinate, everything, or a strided span.
///
/// # Example
///
/// ```
/// use mesh_crust::AxisSelect;
///
/// let fixed: AxisSelect = 4.into();
/// let span: AxisSelect = (0..10).into();
/// let all: AxisSelect = (..).into();
/// assert_eq!(fixed, AxisSelect::At(4));
/// assert_eq!(span, AxisSelect::Span { start: Some(0), stop: Some(10), step: 1 });
/// assert_eq!(all, AxisSelect::All);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSelect {
    /// A single fixed coordinate.
    At(i32),
    /// The full known extent of the axis.
    All,
    /// A strided span. Missing bounds resolve to the known extent.
    Span {
        /// Inclusive start, or the axis minimum when `None`.
        start: Option<i32>,
        /// Exclusive stop, or one past the axis maximum when `None`.
        stop: Option<i32>,
        /// Stride between visited coordinates; values below 1 are
        /// treated as 1.
        step: i32,
    },
}

impl From<i32> for AxisSelect {
    fn from(value: i32) -> Self {
        Self::At(value)
    }
}

impl From<std::ops::Range<i32>> for AxisSelect {
    fn from(range: std::ops::Range<i32>) -> Self {
        Self::Span {
            start: Some(range.start),
            stop: Some(range.end),
            step: 1,
        }
    }
}

impl From<std::ops::RangeFull> for AxisSelect {
    fn from(_: std::ops::RangeFull) -> Self {
        Self::All
    }
}

/// A clipped, strided run of coordinates along one axis.
///
/// Produced by resolving an [`AxisSelect`] against the known data extent
/// `[low, high)`. The resolved start is raised into the extent while
/// staying congruent to the requested start modulo the stride; the
/// resolved stop is lowered to `high`. Iteration yields
/// `start, start + step, ...` strictly below `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    /// First coordinate of the run.
    pub start: i32,
    /// Exclusive upper bound of the run.
    pub stop: i32,
    /// Stride between coordinates, always at least 1.
    pub step: i32,
}

impl AxisRange {
    /// Resolves a selection against the extent `[low, high)`.
    ///
    /// A fixed coordinate is treated as the one-wide span starting at it,
    /// so coordinates outside the extent resolve to an empty range.
    #[must_use]
    pub fn resolve(select: AxisSelect, low: i32, high: i32) -> Self {
        let (start, stop, step) = match select {
            AxisSelect::At(v) => (Some(v), v.checked_add(1), 1),
            AxisSelect::All => (None, None, 1),
            AxisSelect::Span { start, stop, step } => (start, stop, step),
        };
        let step = step.max(1);
        let start = start.unwrap_or(low);
        let stop = stop.unwrap_or(high).min(high);
        // Raising the start into the extent keeps its stride phase.
        let phase = (i64::from(start) - i64::from(low)).rem_euclid(i64::from(step));
        let raised = i64::from(low) + phase;
        let start = i64::from(start).max(raised).min(i64::from(stop)) as i32;
        Self { start, stop, step }
    }

    /// Number of coordinates in the run.
    #[must_use]
    pub fn len(&self) -> usize {
        let span = i64::from(self.stop) - i64::from(self.start);
        if span <= 0 {
            return 0;
        }
        let step = i64::from(self.step);
        ((span + step - 1) / step) as usize
    }

    /// Whether the run is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.stop
    }

    /// Whether `value` is one of the run's coordinates.
    #[must_use]
    pub fn contains(&self, value: i32) -> bool {
        self.start <= value
            && value < self.stop
            && (i64::from(value) - i64::from(self.start)) % i64::from(self.step) == 0
    }

    /// Iterates the run's coordinates.
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        let stop = i64::from(self.stop);
        let step = i64::from(self.step);
        let mut cursor = i64::from(self.start);
        std::iter::from_fn(move || {
            if cursor >= stop {
                return None;
            }
            let value = cursor as i32;
            cursor += step;
            Some(value)
        })
    }
}

/// A lazily iterated box of coordinates built from three axis runs.
///
/// Yields coordinates in axis-major order: x outermost, z innermost.
/// Restartable; [`CoordRange::iter`] can be called repeatedly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordRange {
    /// Run along the x axis.
    pub x: AxisRange,
    /// Run along the y axis.
    pub y: AxisRange,
    /// Run along the z axis.
    pub z: AxisRange,
}

impl CoordRange {
    /// Builds a range from three resolved axis runs.
    #[must_use]
    pub const fn new(x: AxisRange, y: AxisRange, z: AxisRange) -> Self {
        Self { x, y, z }
    }

    /// Resolves three selections against inclusive bounds.
    #[must_use]
    pub fn resolve(selects: [AxisSelect; 3], bounds: GridBounds) -> Self {
        let [sx, sy, sz] = selects;
        Self {
            x: AxisRange::resolve(sx, bounds.min.x, bounds.max.x.saturating_add(1)),
            y: AxisRange::resolve(sy, bounds.min.y, bounds.max.y.saturating_add(1)),
            z: AxisRange::resolve(sz, bounds.min.z, bounds.max.z.saturating_add(1)),
        }
    }

    /// The axis-aligned cube with edge length `edge` starting at `origin`.
    #[must_use]
    pub fn cube(origin: VoxelCoord, edge: usize) -> Self {
        let edge = edge as i32;
        let run = |start: i32| AxisRange {
            start,
            stop: start.saturating_add(edge),
            step: 1,
        };
        Self {
            x: run(origin.x),
            y: run(origin.y),
            z: run(origin.z),
        }
    }

    /// A range that yields nothing.
    #[must_use]
    pub const fn empty() -> Self {
        let none = AxisRange {
            start: 0,
            stop: 0,
            step: 1,
        };
        Self::new(none, none, none)
    }

    /// Number of coordinates in the box.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x
            .len()
            .saturating_mul(self.y.len())
            .saturating_mul(self.z.len())
    }

    /// Whether the box contains no coordinates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// Per-axis coordinate counts.
    #[must_use]
    pub fn shape(&self) -> [usize; 3] {
        [self.x.len(), self.y.len(), self.z.len()]
    }

    /// Whether the box visits `coord`.
    #[must_use]
    pub fn contains(&self, coord: VoxelCoord) -> bool {
        self.x.contains(coord.x) && self.y.contains(coord.y) && self.z.contains(coord.z)
    }

    /// Iterates the box's coordinates.
    #[must_use]
    pub fn iter(&self) -> CoordRangeIter {
        CoordRangeIter {
            range: *self,
            cx: i64::from(self.x.start),
            cy: i64::from(self.y.start),
            cz: i64::from(self.z.start),
            remaining: self.len(),
        }
    }
}

impl IntoIterator for CoordRange {
    type Item = VoxelCoord;
    type IntoIter = CoordRangeIter;

    fn into_iter(self) -> CoordRangeIter {
        self.iter()
    }
}

impl IntoIterator for &CoordRange {
    type Item = VoxelCoord;
    type IntoIter = CoordRangeIter;

    fn into_iter(self) -> CoordRangeIter {
        self.iter()
    }
}

/// Iterator over a [`CoordRange`].
#[derive(Debug, Clone)]
pub struct CoordRangeIter {
    range: CoordRange,
    cx: i64,
    cy: i64,
    cz: i64,
    remaining: usize,
}

impl Iterator for CoordRangeIter {
    type Item = VoxelCoord;

    fn next(&mut self) -> Option<VoxelCoord> {
        if self.remaining == 0 {
            return None;
        }
        let item = VoxelCoord::new(self.cx as i32, self.cy as i32, self.cz as i32);
        self.remaining -= 1;
        self.cz += i64::from(self.range.z.step);
        if self.cz >= i64::from(self.range.z.stop) {
            self.cz = i64::from(self.range.z.start);
            self.cy += i64::from(self.range.y.step);
            if self.cy >= i64::from(self.range.y.stop) {
                self.cy = i64::from(self.range.y.start);
                self.cx += i64::from(self.range.x.step);
            }
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for CoordRangeIter {}

/// Inclusive axis-aligned bounds in voxel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridBounds {
    /// Minimum corner (inclusive).
    pub min: VoxelCoord,
    /// Maximum corner (inclusive).
    pub max: VoxelCoord,
}

impl GridBounds {
    /// Creates bounds from corner coordinates.
    ///
    /// `min` must be component-wise at most `max`.
    #[must_use]
    pub const fn new(min: VoxelCoord, max: VoxelCoord) -> Self {
        Self { min, max }
    }

    /// Bounds covering a single coordinate.
    #[must_use]
    pub const fn at(point: VoxelCoord) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Grows the bounds to cover `coord`.
    pub fn expand_to_include(&mut self, coord: VoxelCoord) {
        self.min.x = self.min.x.min(coord.x);
        self.min.y = self.min.y.min(coord.y);
        self.min.z = self.min.z.min(coord.z);
        self.max.x = self.max.x.max(coord.x);
        self.max.y = self.max.y.max(coord.y);
        self.max.z = self.max.z.max(coord.z);
    }

    /// Per-axis extent in voxels.
    #[must_use]
    pub fn size(&self) -> [usize; 3] {
        [
            (i64::from(self.max.x) - i64::from(self.min.x) + 1) as usize,
            (i64::from(self.max.y) - i64::from(self.min.y) + 1) as usize,
            (i64::from(self.max.z) - i64::from(self.min.z) + 1) as usize,
        ]
    }

    /// Total voxel count covered by the bounds.
    #[must_use]
    pub fn volume(&self) -> usize {
        let [x, y, z] = self.size();
        x.saturating_mul(y).saturating_mul(z)
    }

    /// Whether `coord` lies within the bounds.
    #[must_use]
    pub fn contains(&self, coord: VoxelCoord) -> bool {
        self.min.x <= coord.x
            && coord.x <= self.max.x
            && self.min.y <= coord.y
            && coord.y <= self.max.y
            && self.min.z <= coord.z
            && coord.z <= self.max.z
    }

    /// The step-1 coordinate range covering the bounds.
    #[must_use]
    pub fn to_range(&self) -> CoordRange {
        CoordRange::resolve([AxisSelect::All; 3], *self)
    }

    /// Iterates every coordinate within the bounds.
    #[must_use]
    pub fn iter(&self) -> CoordRangeIter {
        self.to_range().iter()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn span(start: Option<i32>, stop: Option<i32>, step: i32) -> AxisSelect {
        AxisSelect::Span { start, stop, step }
    }

    #[test]
    fn test_resolve_defaults_to_extent() {
        let r = AxisRange::resolve(AxisSelect::All, -3, 4);
        assert_eq!((r.start, r.stop, r.step), (-3, 4, 1));
        assert_eq!(r.len(), 7);
    }

    #[test]
    fn test_resolve_clips_stop() {
        let r = AxisRange::resolve(span(Some(0), Some(100), 1), 0, 10);
        assert_eq!((r.start, r.stop), (0, 10));
    }

    #[test]
    fn test_resolve_raises_start_by_stride_phase() {
        // Requested start below the extent: raised to the first in-extent
        // coordinate congruent to it modulo the stride.
        let r = AxisRange::resolve(span(Some(1), None, 2), 5, 11);
        assert_eq!((r.start, r.stop, r.step), (5, 11, 2));
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![5, 7, 9]);
    }

    #[test]
    fn test_resolve_phase_survives_unaligned_extent() {
        // Extent minimum off the stride grid: the raised start is still
        // congruent to the requested one.
        let r = AxisRange::resolve(span(Some(2), None, 5), 3, 20);
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![7, 12, 17]);
    }

    #[test]
    fn test_resolve_keeps_start_inside_extent() {
        let r = AxisRange::resolve(span(Some(7), None, 2), 5, 11);
        assert_eq!(r.start, 7);
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![7, 9]);
    }

    #[test]
    fn test_resolve_fixed_inside() {
        let r = AxisRange::resolve(AxisSelect::At(7), 5, 11);
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn test_resolve_fixed_outside_is_empty() {
        let below = AxisRange::resolve(AxisSelect::At(3), 5, 11);
        assert!(below.is_empty());
        let above = AxisRange::resolve(AxisSelect::At(11), 5, 11);
        assert!(above.is_empty());
    }

    #[test]
    fn test_resolve_nonpositive_step_treated_as_one() {
        let r = AxisRange::resolve(span(None, None, 0), 0, 3);
        assert_eq!(r.step, 1);
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn test_len_matches_iteration() {
        for step in 1..4 {
            for stop in 0..8 {
                let r = AxisRange::resolve(span(Some(0), Some(stop), step), 0, 100);
                assert_eq!(r.len(), r.iter().count(), "step {step} stop {stop}");
            }
        }
    }

    #[test]
    fn test_contains_respects_stride() {
        let r = AxisRange::resolve(span(Some(2), Some(11), 3), 0, 20);
        assert!(r.contains(2));
        assert!(r.contains(5));
        assert!(r.contains(8));
        assert!(!r.contains(3));
        assert!(!r.contains(11));
    }

    #[test]
    fn test_coord_range_axis_major_order() {
        let bounds = GridBounds::new(VoxelCoord::new(0, 0, 0), VoxelCoord::new(1, 0, 1));
        let range = CoordRange::resolve([AxisSelect::All; 3], bounds);
        let coords: Vec<_> = range.iter().collect();
        assert_eq!(
            coords,
            vec![
                VoxelCoord::new(0, 0, 0),
                VoxelCoord::new(0, 0, 1),
                VoxelCoord::new(1, 0, 0),
                VoxelCoord::new(1, 0, 1),
            ]
        );
    }

    #[test]
    fn test_coord_range_restartable() {
        let range = CoordRange::cube(VoxelCoord::new(-1, -1, -1), 2);
        let first: Vec<_> = range.iter().collect();
        let second: Vec<_> = range.iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 8);
    }

    #[test]
    fn test_coord_range_empty_axis_yields_nothing() {
        let empty = AxisRange {
            start: 5,
            stop: 5,
            step: 1,
        };
        let full = AxisRange {
            start: 0,
            stop: 4,
            step: 1,
        };
        let range = CoordRange::new(full, empty, full);
        assert!(range.is_empty());
        assert_eq!(range.iter().count(), 0);
    }

    #[test]
    fn test_coord_range_exact_size() {
        let range = CoordRange::cube(VoxelCoord::ORIGIN, 3);
        let mut iter = range.iter();
        assert_eq!(iter.len(), 27);
        iter.next();
        assert_eq!(iter.len(), 26);
    }

    #[test]
    fn test_coord_range_contains() {
        let range = CoordRange::cube(VoxelCoord::new(2, 2, 2), 2);
        assert!(range.contains(VoxelCoord::new(3, 2, 3)));
        assert!(!range.contains(VoxelCoord::new(4, 2, 3)));
    }

    #[test]
    fn test_grid_bounds_expand() {
        let mut bounds = GridBounds::at(VoxelCoord::new(1, 1, 1));
        bounds.expand_to_include(VoxelCoord::new(-2, 5, 1));
        assert_eq!(bounds.min, VoxelCoord::new(-2, 1, 1));
        assert_eq!(bounds.max, VoxelCoord::new(1, 5, 1));
    }

    #[test]
    fn test_grid_bounds_size_and_volume() {
        let bounds = GridBounds::new(VoxelCoord::new(0, 0, 0), VoxelCoord::new(1, 2, 3));
        assert_eq!(bounds.size(), [2, 3, 4]);
        assert_eq!(bounds.volume(), 24);
        assert_eq!(bounds.iter().count(), 24);
    }

    #[test]
    fn test_grid_bounds_contains() {
        let bounds = GridBounds::new(VoxelCoord::new(-1, -1, -1), VoxelCoord::new(1, 1, 1));
        assert!(bounds.contains(VoxelCoord::ORIGIN));
        assert!(bounds.contains(VoxelCoord::new(1, -1, 0)));
        assert!(!bounds.contains(VoxelCoord::new(2, 0, 0)));
    }
}
