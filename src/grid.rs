//! Sparse chunked voxel grids over unbounded coordinate space.
//!
//! A [`ChunkGrid`] stores values for an unbounded 3-D lattice by keeping
//! a sparse map of fixed-size [`Chunk`]s. Every coordinate always reads
//! a value: coordinates in absent chunks read the grid's fill value.
//! Reads never allocate; writes materialize the containing chunk on
//! demand.

// Chunk sizes are validated positive at construction and small enough
// that the usize/i32 conversions cannot overflow.
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

use std::ops::{BitAnd, BitOr, Not};

use crate::chunk::Chunk;
use crate::coord::VoxelCoord;
use crate::error::{CrustError, CrustResult};
use crate::index_map::CoordMap;
use crate::range::{AxisSelect, CoordRange, GridBounds};

/// A sparse voxel grid of value type `T` with chunked storage.
///
/// # Example
///
/// ```
/// use mesh_crust::{ChunkGrid, VoxelCoord};
///
/// let mut grid = ChunkGrid::try_new(16, false)?;
/// assert!(!grid.get(VoxelCoord::new(100, -3, 7)));
///
/// grid.set(VoxelCoord::new(100, -3, 7), true);
/// assert!(grid.get(VoxelCoord::new(100, -3, 7)));
/// assert_eq!(grid.chunk_count(), 1);
/// # Ok::<(), mesh_crust::CrustError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChunkGrid<T> {
    chunk_size: usize,
    fill_value: T,
    chunks: CoordMap<Chunk<T>>,
}

impl<T: Copy + PartialEq> ChunkGrid<T> {
    /// Creates an empty grid.
    ///
    /// # Errors
    ///
    /// Returns [`CrustError::InvalidChunkSize`] when `chunk_size` is
    /// zero.
    pub fn try_new(chunk_size: usize, fill_value: T) -> CrustResult<Self> {
        if chunk_size == 0 {
            return Err(CrustError::InvalidChunkSize(chunk_size));
        }
        Ok(Self {
            chunk_size,
            fill_value,
            chunks: CoordMap::new(),
        })
    }

    /// An empty grid with the same chunk size but a different value
    /// type and fill.
    #[must_use]
    pub fn like<U: Copy + PartialEq>(&self, fill_value: U) -> ChunkGrid<U> {
        ChunkGrid {
            chunk_size: self.chunk_size,
            fill_value,
            chunks: CoordMap::new(),
        }
    }

    /// Edge length of each chunk in voxels.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The value read from coordinates in absent chunks.
    #[must_use]
    pub fn fill_value(&self) -> T {
        self.fill_value
    }

    fn edge_i32(&self) -> i32 {
        self.chunk_size as i32
    }

    /// The value at a coordinate. Never allocates.
    #[must_use]
    pub fn get(&self, pos: VoxelCoord) -> T {
        self.chunk_at(pos)
            .map_or(self.fill_value, |chunk| chunk.value_at(pos))
    }

    /// Values at a batch of coordinates, fill-substituted where absent.
    #[must_use]
    pub fn get_many(&self, positions: &[VoxelCoord]) -> Vec<T> {
        positions.iter().map(|&pos| self.get(pos)).collect()
    }

    /// Writes a value, materializing the containing chunk if needed.
    pub fn set(&mut self, pos: VoxelCoord, value: T) {
        let index = pos.chunk_index(self.edge_i32());
        self.ensure_chunk(index).set(pos, value);
    }

    /// Writes the same value at every coordinate of an iterator.
    pub fn set_all<I: IntoIterator<Item = VoxelCoord>>(&mut self, positions: I, value: T) {
        for pos in positions {
            self.set(pos, value);
        }
    }

    /// The resident chunk covering a coordinate, if any.
    #[must_use]
    pub fn chunk_at(&self, pos: VoxelCoord) -> Option<&Chunk<T>> {
        self.chunks.get(pos.chunk_index(self.edge_i32()))
    }

    /// The resident chunk at a chunk index, if any.
    #[must_use]
    pub fn chunk_by_index(&self, index: VoxelCoord) -> Option<&Chunk<T>> {
        self.chunks.get(index)
    }

    /// The chunk at a chunk index, materializing a uniform fill chunk
    /// if absent.
    pub fn ensure_chunk(&mut self, index: VoxelCoord) -> &mut Chunk<T> {
        let edge = self.chunk_size;
        let fill = self.fill_value;
        self.chunks
            .get_or_insert_with(index, || Chunk::uniform(index, edge, fill))
    }

    /// Number of resident chunks.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Iterates resident chunk indices in arbitrary order.
    pub fn chunk_indices(&self) -> impl Iterator<Item = VoxelCoord> + '_ {
        self.chunks.keys()
    }

    /// Resident chunk indices in ascending coordinate order.
    #[must_use]
    pub fn sorted_chunk_indices(&self) -> Vec<VoxelCoord> {
        self.chunks.sorted_keys()
    }

    /// Iterates resident chunks in arbitrary order.
    pub fn resident_chunks(&self) -> impl Iterator<Item = &Chunk<T>> {
        self.chunks.values()
    }

    /// Inclusive voxel-space bounds of all resident chunks, or `None`
    /// for an empty grid.
    #[must_use]
    pub fn bounds(&self) -> Option<GridBounds> {
        let n = self.edge_i32();
        self.chunks.bounds().map(|chunk_bounds| {
            GridBounds::new(
                chunk_bounds.min.scaled(n),
                chunk_bounds.max.scaled(n) + VoxelCoord::new(n - 1, n - 1, n - 1),
            )
        })
    }

    /// Resolves per-axis selections against the resident bounds.
    ///
    /// An empty grid resolves to an empty range.
    #[must_use]
    pub fn range_of(&self, selects: [AxisSelect; 3]) -> CoordRange {
        match self.bounds() {
            Some(bounds) => CoordRange::resolve(selects, bounds),
            None => CoordRange::empty(),
        }
    }

    /// Iterates `(coordinate, value)` over an axis selection in
    /// axis-major order, fill-substituting absent chunks.
    pub fn iter_selected(
        &self,
        selects: [AxisSelect; 3],
    ) -> impl Iterator<Item = (VoxelCoord, T)> + '_ {
        self.range_of(selects)
            .iter()
            .map(move |pos| (pos, self.get(pos)))
    }

    /// Writes one value across an axis selection.
    pub fn set_selected(&mut self, selects: [AxisSelect; 3], value: T) {
        let range = self.range_of(selects);
        for pos in range {
            self.set(pos, value);
        }
    }

    /// Iterates `(coordinate, value)` over every voxel open in `mask`,
    /// in ascending coordinate order.
    ///
    /// Bounded to the resident chunks of the two grids: open mask
    /// voxels in regions where neither grid holds a chunk are not
    /// visited.
    pub fn iter_where<'a>(
        &'a self,
        mask: &'a ChunkGrid<bool>,
    ) -> impl Iterator<Item = (VoxelCoord, T)> + 'a {
        debug_assert_eq!(self.chunk_size, mask.chunk_size, "grids must share a chunk size");
        let n = self.chunk_size;
        let mask_fill = mask.fill_value;
        let mut indices: Vec<VoxelCoord> = mask.chunks.keys().collect();
        if mask_fill {
            indices.extend(self.chunks.keys());
        }
        indices.sort_unstable();
        indices.dedup();
        indices.into_iter().flat_map(move |index| {
            let mask_chunk = mask.chunk_by_index(index);
            CoordRange::cube(index.scaled(n as i32), n)
                .iter()
                .filter_map(move |pos| {
                    let open = mask_chunk.map_or(mask_fill, |chunk| chunk.value_at(pos));
                    open.then(|| (pos, self.get(pos)))
                })
        })
    }

    /// Writes one value at every voxel open in `mask`.
    ///
    /// Bounded like [`ChunkGrid::iter_where`]: open mask voxels in
    /// regions where neither grid holds a chunk are not written.
    pub fn set_where(&mut self, mask: &ChunkGrid<bool>, value: T) {
        debug_assert_eq!(self.chunk_size, mask.chunk_size, "grids must share a chunk size");
        let mut indices: Vec<VoxelCoord> = mask.chunks.keys().collect();
        if mask.fill_value {
            indices.extend(self.chunks.keys());
            indices.sort_unstable();
            indices.dedup();
        }
        for index in indices {
            match mask.chunk_by_index(index) {
                Some(mask_chunk) if mask_chunk.uniform_value() == Some(true) => {
                    self.ensure_chunk(index).fill(value);
                }
                Some(mask_chunk) => {
                    if !mask_chunk.any() {
                        continue;
                    }
                    let target = self.ensure_chunk(index);
                    for pos in mask_chunk.iter_set() {
                        target.set(pos, value);
                    }
                }
                None => {
                    self.ensure_chunk(index).fill(value);
                }
            }
        }
    }

    /// Element-wise conversion to a grid of another value type.
    ///
    /// The fill value maps through `f` as well, so absent regions stay
    /// consistent.
    #[must_use]
    pub fn map<U, F>(&self, f: F) -> ChunkGrid<U>
    where
        U: Copy + PartialEq,
        F: Fn(T) -> U,
    {
        let mut out = ChunkGrid {
            chunk_size: self.chunk_size,
            fill_value: f(self.fill_value),
            chunks: CoordMap::new(),
        };
        for (index, chunk) in self.chunks.iter() {
            out.chunks.insert(index, chunk.map(&f));
        }
        out
    }

    /// Element-wise combination of two grids over the union of their
    /// resident chunks.
    ///
    /// Where only one grid holds a chunk, the other side contributes
    /// its fill value. The output fill is `f` applied to both fills.
    #[must_use]
    pub fn zip_map<U, V, F>(&self, other: &ChunkGrid<U>, f: F) -> ChunkGrid<V>
    where
        U: Copy + PartialEq,
        V: Copy + PartialEq,
        F: Fn(T, U) -> V,
    {
        debug_assert_eq!(self.chunk_size, other.chunk_size, "grids must share a chunk size");
        let mut out = ChunkGrid {
            chunk_size: self.chunk_size,
            fill_value: f(self.fill_value, other.fill_value),
            chunks: CoordMap::new(),
        };
        let mut indices: Vec<VoxelCoord> = self.chunks.keys().collect();
        indices.extend(other.chunks.keys());
        indices.sort_unstable();
        indices.dedup();
        for index in indices {
            let combined = match (self.chunk_by_index(index), other.chunk_by_index(index)) {
                (Some(a), Some(b)) => a.zip_map(b, &f),
                (Some(a), None) => a.map(|v| f(v, other.fill_value)),
                (None, Some(b)) => b.map(|u| f(self.fill_value, u)),
                (None, None) => continue,
            };
            out.chunks.insert(index, combined);
        }
        out
    }

    /// A boolean grid marking voxels equal to `value`.
    #[must_use]
    pub fn eq_scalar(&self, value: T) -> ChunkGrid<bool> {
        self.map(|v| v == value)
    }

    /// Materializes `rings` layers of neighbor chunks around every
    /// populated chunk.
    ///
    /// A chunk counts as populated when any voxel differs from the
    /// fill value. New chunks are uniform fill; existing chunks are
    /// untouched, so the call is idempotent.
    pub fn pad_chunks(&mut self, rings: usize) {
        if rings == 0 {
            return;
        }
        let r = rings as i32;
        let populated: Vec<VoxelCoord> = self
            .chunks
            .iter()
            .filter(|(_, chunk)| chunk.any_differs(self.fill_value))
            .map(|(index, _)| index)
            .collect();
        for index in populated {
            let low = index - VoxelCoord::new(r, r, r);
            for neighbor in CoordRange::cube(low, 2 * rings + 1) {
                self.ensure_chunk(neighbor);
            }
        }
    }

    /// Iterates resident chunks on the hull of the resident set, in
    /// ascending index order.
    ///
    /// A chunk is on the hull when at least one of its 26 neighbor
    /// chunks is absent.
    pub fn iter_hull(&self) -> impl Iterator<Item = &Chunk<T>> + '_ {
        self.sorted_chunk_indices()
            .into_iter()
            .filter(|index| {
                index
                    .all_neighbors()
                    .iter()
                    .any(|neighbor| !self.chunks.contains(*neighbor))
            })
            .filter_map(move |index| self.chunk_by_index(index))
    }

    /// Iterates every resident voxel with its value, in ascending
    /// coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (VoxelCoord, T)> + '_ {
        self.sorted_chunk_indices()
            .into_iter()
            .filter_map(move |index| self.chunk_by_index(index))
            .flat_map(Chunk::iter_values)
    }
}

impl ChunkGrid<bool> {
    /// Whether any resident voxel is set.
    #[must_use]
    pub fn any(&self) -> bool {
        self.chunks.values().any(Chunk::any)
    }

    /// Total number of set voxels across resident chunks.
    #[must_use]
    pub fn count_set(&self) -> usize {
        self.chunks.values().map(Chunk::count_set).sum()
    }

    /// Iterates the coordinates of all set voxels in ascending order.
    pub fn iter_set(&self) -> impl Iterator<Item = VoxelCoord> + '_ {
        self.sorted_chunk_indices()
            .into_iter()
            .filter_map(move |index| self.chunk_by_index(index))
            .flat_map(Chunk::iter_set)
    }
}

impl BitAnd for &ChunkGrid<bool> {
    type Output = ChunkGrid<bool>;

    fn bitand(self, rhs: Self) -> ChunkGrid<bool> {
        self.zip_map(rhs, |a, b| a && b)
    }
}

impl BitOr for &ChunkGrid<bool> {
    type Output = ChunkGrid<bool>;

    fn bitor(self, rhs: Self) -> ChunkGrid<bool> {
        self.zip_map(rhs, |a, b| a || b)
    }
}

impl Not for &ChunkGrid<bool> {
    type Output = ChunkGrid<bool>;

    fn not(self) -> ChunkGrid<bool> {
        self.map(|v| !v)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp)]

    use super::*;

    fn c(x: i32, y: i32, z: i32) -> VoxelCoord {
        VoxelCoord::new(x, y, z)
    }

    #[test]
    fn test_try_new_rejects_zero_chunk_size() {
        assert!(matches!(
            ChunkGrid::<bool>::try_new(0, false),
            Err(CrustError::InvalidChunkSize(0))
        ));
    }

    #[test]
    fn test_reads_never_create_chunks() {
        let grid = ChunkGrid::try_new(8, 1.5f64).unwrap();
        assert_eq!(grid.get(c(100, 100, 100)), 1.5);
        assert_eq!(grid.get(c(-50, 0, 3)), 1.5);
        assert_eq!(grid.chunk_count(), 0);
    }

    #[test]
    fn test_writes_materialize_one_chunk() {
        let mut grid = ChunkGrid::try_new(8, false).unwrap();
        grid.set(c(3, 3, 3), true);
        grid.set(c(7, 0, 0), true);
        assert_eq!(grid.chunk_count(), 1);
        grid.set(c(-1, 0, 0), true);
        assert_eq!(grid.chunk_count(), 2);
        assert!(grid.chunk_by_index(c(-1, 0, 0)).is_some());
    }

    #[test]
    fn test_get_many_substitutes_fill() {
        let mut grid = ChunkGrid::try_new(4, 0i32).unwrap();
        grid.set(c(1, 1, 1), 9);
        let values = grid.get_many(&[c(1, 1, 1), c(40, 40, 40)]);
        assert_eq!(values, vec![9, 0]);
    }

    #[test]
    fn test_bounds_cover_resident_chunks() {
        let mut grid = ChunkGrid::try_new(4, false).unwrap();
        assert_eq!(grid.bounds(), None);
        grid.set(c(0, 0, 0), true);
        grid.set(c(-1, 5, 2), true);
        let bounds = grid.bounds().unwrap();
        assert_eq!(bounds.min, c(-4, 0, 0));
        assert_eq!(bounds.max, c(3, 7, 3));
    }

    #[test]
    fn test_selected_read_and_write() {
        let mut grid = ChunkGrid::try_new(4, 0i32).unwrap();
        grid.set(c(0, 0, 0), 1);
        grid.set(c(2, 0, 0), 3);
        let x_axis: Vec<_> = grid
            .iter_selected([AxisSelect::All, AxisSelect::At(0), AxisSelect::At(0)])
            .map(|(_, v)| v)
            .collect();
        assert_eq!(x_axis, vec![1, 0, 3, 0]);

        grid.set_selected([AxisSelect::All, AxisSelect::At(0), AxisSelect::At(0)], 7);
        assert_eq!(grid.get(c(1, 0, 0)), 7);
        assert_eq!(grid.get(c(3, 0, 0)), 7);
        // Off-selection voxels keep their values.
        assert_eq!(grid.get(c(0, 1, 0)), 0);
    }

    #[test]
    fn test_selected_on_empty_grid_is_empty() {
        let grid = ChunkGrid::<i32>::try_new(4, 0).unwrap();
        assert_eq!(grid.iter_selected([AxisSelect::All; 3]).count(), 0);
    }

    #[test]
    fn test_masked_read_and_write() {
        let mut grid = ChunkGrid::try_new(4, 0.0f64).unwrap();
        grid.set(c(0, 0, 0), 0.25);
        grid.set(c(1, 1, 1), 0.5);

        let mut mask = grid.like(false);
        mask.set(c(1, 1, 1), true);
        mask.set(c(2, 2, 2), true);

        let read: Vec<_> = grid.iter_where(&mask).collect();
        assert_eq!(read, vec![(c(1, 1, 1), 0.5), (c(2, 2, 2), 0.0)]);

        grid.set_where(&mask, 9.0);
        assert_eq!(grid.get(c(1, 1, 1)), 9.0);
        assert_eq!(grid.get(c(2, 2, 2)), 9.0);
        assert_eq!(grid.get(c(0, 0, 0)), 0.25);
    }

    #[test]
    fn test_set_where_uniform_mask_chunk_fast_path() {
        let mut grid = ChunkGrid::try_new(4, 0i32).unwrap();
        let mut mask = grid.like(false);
        mask.ensure_chunk(c(1, 0, 0)).fill(true);
        grid.set_where(&mask, 5);
        let chunk = grid.chunk_by_index(c(1, 0, 0)).unwrap();
        assert!(chunk.is_uniform());
        assert_eq!(chunk.uniform_value(), Some(5));
    }

    #[test]
    fn test_set_where_skips_all_false_mask_chunks() {
        let mut grid = ChunkGrid::try_new(4, 0i32).unwrap();
        let mut mask = grid.like(false);
        mask.ensure_chunk(c(0, 0, 0));
        grid.set_where(&mask, 5);
        assert_eq!(grid.chunk_count(), 0);
    }

    #[test]
    fn test_pad_chunks_surrounds_populated() {
        let mut grid = ChunkGrid::try_new(4, false).unwrap();
        grid.set(c(0, 0, 0), true);
        grid.pad_chunks(1);
        assert_eq!(grid.chunk_count(), 27);
        // Only the original chunk has content.
        let set: Vec<_> = grid.iter_set().collect();
        assert_eq!(set, vec![c(0, 0, 0)]);
    }

    #[test]
    fn test_pad_chunks_is_idempotent() {
        let mut grid = ChunkGrid::try_new(4, false).unwrap();
        grid.set(c(0, 0, 0), true);
        grid.pad_chunks(1);
        let before = grid.clone();
        grid.pad_chunks(1);
        assert_eq!(grid, before);
        assert_eq!(grid.chunk_count(), 27);
    }

    #[test]
    fn test_pad_chunks_ignores_uniform_fill_chunks() {
        let mut grid = ChunkGrid::try_new(4, false).unwrap();
        grid.ensure_chunk(c(5, 5, 5));
        grid.pad_chunks(1);
        // No populated chunk, so nothing is added.
        assert_eq!(grid.chunk_count(), 1);
    }

    #[test]
    fn test_iter_hull_on_cube_of_chunks() {
        let mut grid = ChunkGrid::try_new(4, false).unwrap();
        for index in CoordRange::cube(c(0, 0, 0), 3) {
            grid.ensure_chunk(index);
        }
        // All but the center chunk are on the hull.
        assert_eq!(grid.iter_hull().count(), 26);
        assert!(grid.iter_hull().all(|chunk| chunk.index() != c(1, 1, 1)));
    }

    #[test]
    fn test_operators_respect_fill() {
        let mut a = ChunkGrid::try_new(4, false).unwrap();
        a.set(c(0, 0, 0), true);
        a.set(c(1, 0, 0), true);
        let mut b = ChunkGrid::try_new(4, false).unwrap();
        b.set(c(1, 0, 0), true);
        // b has no chunk at (1, 1, 1); its fill participates.
        b.set(c(40, 40, 40), true);

        let and = &a & &b;
        assert!(!and.fill_value());
        assert!(and.get(c(1, 0, 0)));
        assert!(!and.get(c(0, 0, 0)));
        assert!(!and.get(c(40, 40, 40)));

        let or = &a | &b;
        assert!(or.get(c(0, 0, 0)));
        assert!(or.get(c(40, 40, 40)));

        let inverted = !&a;
        assert!(inverted.fill_value());
        assert!(!inverted.get(c(0, 0, 0)));
        assert!(inverted.get(c(2, 0, 0)));
    }

    #[test]
    fn test_map_transforms_fill_and_chunks() {
        let mut flags = ChunkGrid::try_new(4, false).unwrap();
        flags.set(c(1, 0, 0), true);
        let labels = flags.map(i32::from);
        assert_eq!(labels.fill_value(), 0);
        assert_eq!(labels.get(c(1, 0, 0)), 1);
        assert_eq!(labels.get(c(0, 0, 0)), 0);
        assert_eq!(labels.chunk_count(), flags.chunk_count());
    }

    #[test]
    fn test_eq_scalar() {
        let mut grid = ChunkGrid::try_new(4, 0.0f64).unwrap();
        grid.set(c(0, 0, 0), 1.0);
        let ones = grid.eq_scalar(1.0);
        assert!(ones.get(c(0, 0, 0)));
        assert!(!ones.get(c(1, 0, 0)));
        assert!(!ones.fill_value());
    }

    #[test]
    fn test_zip_map_over_disjoint_chunks() {
        let mut a = ChunkGrid::try_new(4, 0i32).unwrap();
        a.set(c(0, 0, 0), 2);
        let mut b = ChunkGrid::try_new(4, 10i32).unwrap();
        b.set(c(40, 0, 0), 3);
        let sum = a.zip_map(&b, |x, y| x + y);
        assert_eq!(sum.fill_value(), 10);
        assert_eq!(sum.get(c(0, 0, 0)), 12);
        assert_eq!(sum.get(c(40, 0, 0)), 3);
        assert_eq!(sum.get(c(80, 80, 80)), 10);
    }

    #[test]
    fn test_clone_is_independent_snapshot() {
        let mut grid = ChunkGrid::try_new(4, false).unwrap();
        grid.set(c(0, 0, 0), true);
        let snapshot = grid.clone();
        grid.set(c(0, 0, 0), false);
        grid.set(c(3, 3, 3), true);
        assert!(snapshot.get(c(0, 0, 0)));
        assert!(!snapshot.get(c(3, 3, 3)));
    }

    #[test]
    fn test_count_and_iter_set_agree() {
        let mut grid = ChunkGrid::try_new(4, false).unwrap();
        grid.set(c(0, 0, 0), true);
        grid.set(c(-3, 2, 1), true);
        grid.set(c(9, 9, 9), true);
        let listed: Vec<_> = grid.iter_set().collect();
        assert_eq!(listed.len(), grid.count_set());
        let mut sorted = listed.clone();
        sorted.sort_unstable();
        assert_eq!(listed, sorted);
    }
}
