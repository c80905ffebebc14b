//! Fixed-size voxel blocks with uniform and dense representations.
//!
//! A [`Chunk`] covers an N×N×N region of voxel space at a chunk-aligned
//! origin. Chunks holding a single repeated value stay in an
//! allocation-free uniform representation; the first divergent write
//! densifies them. Conversion between the two forms is lossless.

// Chunk edges are small (typically 16), so products of local offsets and
// edge lengths stay far below the integer limits involved in the casts.
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]

use crate::coord::VoxelCoord;
use crate::error::{CrustError, CrustResult};
use crate::grid::ChunkGrid;
use crate::range::CoordRange;

/// A dense cubic block of voxel values in axis-major order (x slowest,
/// z fastest).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DenseBlock<T> {
    edge: usize,
    values: Vec<T>,
}

impl<T: Copy> DenseBlock<T> {
    /// A block with every value set to `value`.
    #[must_use]
    pub fn filled(edge: usize, value: T) -> Self {
        Self {
            edge,
            values: vec![value; edge * edge * edge],
        }
    }

    /// Builds a block from raw values in axis-major order.
    ///
    /// # Errors
    ///
    /// Returns [`CrustError::BlockSizeMismatch`] when `values` does not
    /// hold exactly `edge³` entries.
    pub fn from_values(edge: usize, values: Vec<T>) -> CrustResult<Self> {
        let expected = edge * edge * edge;
        if values.len() != expected {
            return Err(CrustError::BlockSizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { edge, values })
    }

    /// Edge length of the block.
    #[must_use]
    pub fn edge(&self) -> usize {
        self.edge
    }

    /// Total number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the block holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The raw values in axis-major order.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// The value at a local offset, or `None` outside the block.
    #[must_use]
    pub fn get(&self, local: [usize; 3]) -> Option<T> {
        let [x, y, z] = local;
        if x >= self.edge || y >= self.edge || z >= self.edge {
            return None;
        }
        Some(self.values[self.linear(local)])
    }

    /// The value at a local offset.
    ///
    /// `local` must lie within the block.
    #[must_use]
    pub fn value_at(&self, local: [usize; 3]) -> T {
        self.values[self.linear(local)]
    }

    /// Writes the value at a local offset.
    ///
    /// `local` must lie within the block.
    pub fn set(&mut self, local: [usize; 3], value: T) {
        let i = self.linear(local);
        self.values[i] = value;
    }

    fn linear(&self, [x, y, z]: [usize; 3]) -> usize {
        (x * self.edge + y) * self.edge + z
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
enum ChunkRepr<T> {
    Uniform(T),
    Dense(DenseBlock<T>),
}

/// One N³ block of a chunk grid.
///
/// Carries its own chunk index and edge length, so its grid-space origin
/// is always `index * edge` ([`Chunk::position_low`]).
///
/// # Example
///
/// ```
/// use mesh_crust::{Chunk, VoxelCoord};
///
/// let mut chunk = Chunk::uniform(VoxelCoord::new(1, 0, 0), 8, false);
/// assert!(chunk.is_uniform());
/// assert_eq!(chunk.position_low(), VoxelCoord::new(8, 0, 0));
///
/// chunk.set(VoxelCoord::new(9, 2, 3), true);
/// assert!(!chunk.is_uniform());
/// assert_eq!(chunk.get(VoxelCoord::new(9, 2, 3)), Some(true));
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chunk<T> {
    index: VoxelCoord,
    edge: usize,
    repr: ChunkRepr<T>,
}

impl<T: Copy + PartialEq> Chunk<T> {
    /// A chunk with every voxel set to `value`.
    #[must_use]
    pub fn uniform(index: VoxelCoord, edge: usize, value: T) -> Self {
        Self {
            index,
            edge,
            repr: ChunkRepr::Uniform(value),
        }
    }

    /// The chunk's index in its grid.
    #[must_use]
    pub fn index(&self) -> VoxelCoord {
        self.index
    }

    /// Edge length in voxels.
    #[must_use]
    pub fn edge(&self) -> usize {
        self.edge
    }

    /// Total voxel count (`edge³`).
    #[must_use]
    pub fn volume(&self) -> usize {
        self.edge * self.edge * self.edge
    }

    /// The grid-space coordinate of the chunk's minimum corner.
    #[must_use]
    pub fn position_low(&self) -> VoxelCoord {
        self.index.scaled(self.edge as i32)
    }

    /// Whether the chunk is in the uniform representation.
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        matches!(self.repr, ChunkRepr::Uniform(_))
    }

    /// The uniform fill value, when uniformly represented.
    #[must_use]
    pub fn uniform_value(&self) -> Option<T> {
        match &self.repr {
            ChunkRepr::Uniform(value) => Some(*value),
            ChunkRepr::Dense(_) => None,
        }
    }

    /// Whether the global coordinate falls inside this chunk.
    #[must_use]
    pub fn contains(&self, pos: VoxelCoord) -> bool {
        pos.chunk_index(self.edge as i32) == self.index
    }

    /// The value at a global coordinate, or `None` outside the chunk.
    #[must_use]
    pub fn get(&self, pos: VoxelCoord) -> Option<T> {
        if self.contains(pos) {
            Some(self.value_at(pos))
        } else {
            None
        }
    }

    /// The value at a global coordinate.
    ///
    /// `pos` must fall inside this chunk.
    #[must_use]
    pub fn value_at(&self, pos: VoxelCoord) -> T {
        debug_assert!(self.contains(pos), "{pos:?} is outside chunk {:?}", self.index);
        self.value_at_local(pos.local_offset(self.edge as i32))
    }

    /// The value at a local offset within the chunk.
    #[must_use]
    pub fn value_at_local(&self, local: [usize; 3]) -> T {
        match &self.repr {
            ChunkRepr::Uniform(value) => *value,
            ChunkRepr::Dense(block) => block.value_at(local),
        }
    }

    /// Writes a value at a global coordinate.
    ///
    /// A uniform chunk densifies on the first divergent write; writing
    /// the uniform value back is a no-op. `pos` must fall inside this
    /// chunk.
    pub fn set(&mut self, pos: VoxelCoord, value: T) {
        debug_assert!(self.contains(pos), "{pos:?} is outside chunk {:?}", self.index);
        self.set_local(pos.local_offset(self.edge as i32), value);
    }

    /// Writes a value at a local offset within the chunk.
    pub fn set_local(&mut self, local: [usize; 3], value: T) {
        match &mut self.repr {
            ChunkRepr::Uniform(current) => {
                if *current == value {
                    return;
                }
                let mut block = DenseBlock::filled(self.edge, *current);
                block.set(local, value);
                self.repr = ChunkRepr::Dense(block);
            }
            ChunkRepr::Dense(block) => block.set(local, value),
        }
    }

    /// Collapses the chunk back to a uniform fill.
    pub fn fill(&mut self, value: T) {
        self.repr = ChunkRepr::Uniform(value);
    }

    /// Materializes a dense copy of the chunk's values.
    #[must_use]
    pub fn to_dense(&self) -> DenseBlock<T> {
        match &self.repr {
            ChunkRepr::Uniform(value) => DenseBlock::filled(self.edge, *value),
            ChunkRepr::Dense(block) => block.clone(),
        }
    }

    /// Replaces the chunk's contents from a dense block.
    ///
    /// # Errors
    ///
    /// Returns [`CrustError::BlockSizeMismatch`] when the block's edge
    /// length differs from the chunk's.
    pub fn set_block(&mut self, block: DenseBlock<T>) -> CrustResult<()> {
        if block.edge != self.edge {
            return Err(CrustError::BlockSizeMismatch {
                expected: self.volume(),
                actual: block.len(),
            });
        }
        self.repr = ChunkRepr::Dense(block);
        Ok(())
    }

    /// Whether any voxel differs from `value`.
    #[must_use]
    pub fn any_differs(&self, value: T) -> bool {
        match &self.repr {
            ChunkRepr::Uniform(current) => *current != value,
            ChunkRepr::Dense(block) => block.values.iter().any(|v| *v != value),
        }
    }

    /// An `(edge + 2·width)³` dense block holding this chunk's values
    /// surrounded by `width` layers pulled from neighboring chunks.
    ///
    /// Voxels in absent neighbor chunks read as the grid's fill value.
    /// Pure read: neither the chunk nor the grid is modified. `width`
    /// must not exceed the chunk edge.
    #[must_use]
    pub fn padded(&self, grid: &ChunkGrid<T>, width: usize) -> DenseBlock<T> {
        debug_assert!(width <= self.edge, "padding width cannot exceed the chunk edge");
        let n = self.edge as i32;
        let fill = grid.fill_value();
        let neighbors: [[[Option<&Self>; 3]; 3]; 3] = std::array::from_fn(|dx| {
            std::array::from_fn(|dy| {
                std::array::from_fn(|dz| {
                    let offset = VoxelCoord::new(dx as i32 - 1, dy as i32 - 1, dz as i32 - 1);
                    if offset == VoxelCoord::ORIGIN {
                        Some(self)
                    } else {
                        grid.chunk_by_index(self.index + offset)
                    }
                })
            })
        });
        let padded_edge = self.edge + 2 * width;
        let low = self.position_low() - VoxelCoord::new(width as i32, width as i32, width as i32);
        let mut out = DenseBlock::filled(padded_edge, fill);
        for i in 0..padded_edge {
            for j in 0..padded_edge {
                for k in 0..padded_edge {
                    let pos = low + VoxelCoord::new(i as i32, j as i32, k as i32);
                    let ci = (pos.x.div_euclid(n) - self.index.x + 1) as usize;
                    let cj = (pos.y.div_euclid(n) - self.index.y + 1) as usize;
                    let ck = (pos.z.div_euclid(n) - self.index.z + 1) as usize;
                    let value = match neighbors[ci][cj][ck] {
                        Some(chunk) => chunk.value_at(pos),
                        None => fill,
                    };
                    out.set([i, j, k], value);
                }
            }
        }
        out
    }

    /// Element-wise conversion to a chunk of another value type.
    ///
    /// A uniform chunk stays uniform.
    #[must_use]
    pub fn map<U, F>(&self, f: F) -> Chunk<U>
    where
        U: Copy + PartialEq,
        F: Fn(T) -> U,
    {
        let repr = match &self.repr {
            ChunkRepr::Uniform(value) => ChunkRepr::Uniform(f(*value)),
            ChunkRepr::Dense(block) => ChunkRepr::Dense(DenseBlock {
                edge: block.edge,
                values: block.values.iter().map(|&v| f(v)).collect(),
            }),
        };
        Chunk {
            index: self.index,
            edge: self.edge,
            repr,
        }
    }

    /// Element-wise combination with another chunk covering the same
    /// region.
    ///
    /// Two uniform chunks combine into a uniform chunk.
    #[must_use]
    pub fn zip_map<U, V, F>(&self, other: &Chunk<U>, f: F) -> Chunk<V>
    where
        U: Copy + PartialEq,
        V: Copy + PartialEq,
        F: Fn(T, U) -> V,
    {
        debug_assert_eq!(self.index, other.index, "chunks must cover the same region");
        debug_assert_eq!(self.edge, other.edge, "chunks must share an edge length");
        let repr = match (&self.repr, &other.repr) {
            (ChunkRepr::Uniform(a), ChunkRepr::Uniform(b)) => ChunkRepr::Uniform(f(*a, *b)),
            _ => {
                let values = (0..self.volume())
                    .map(|i| f(self.value_linear(i), other.value_linear(i)))
                    .collect();
                ChunkRepr::Dense(DenseBlock {
                    edge: self.edge,
                    values,
                })
            }
        };
        Chunk {
            index: self.index,
            edge: self.edge,
            repr,
        }
    }

    /// Iterates every voxel of the chunk with its global coordinate, in
    /// axis-major order.
    pub fn iter_values(&self) -> impl Iterator<Item = (VoxelCoord, T)> + '_ {
        CoordRange::cube(self.position_low(), self.edge)
            .iter()
            .map(move |pos| (pos, self.value_at(pos)))
    }

    fn value_linear(&self, i: usize) -> T {
        match &self.repr {
            ChunkRepr::Uniform(value) => *value,
            ChunkRepr::Dense(block) => block.values[i],
        }
    }

    fn coord_of_linear(&self, i: usize) -> VoxelCoord {
        let n = self.edge;
        let local = VoxelCoord::new((i / (n * n)) as i32, ((i / n) % n) as i32, (i % n) as i32);
        self.position_low() + local
    }
}

impl Chunk<bool> {
    /// Whether any voxel is set.
    #[must_use]
    pub fn any(&self) -> bool {
        match &self.repr {
            ChunkRepr::Uniform(value) => *value,
            ChunkRepr::Dense(block) => block.values.iter().any(|&v| v),
        }
    }

    /// Whether every voxel is set.
    #[must_use]
    pub fn all(&self) -> bool {
        match &self.repr {
            ChunkRepr::Uniform(value) => *value,
            ChunkRepr::Dense(block) => block.values.iter().all(|&v| v),
        }
    }

    /// Number of set voxels.
    #[must_use]
    pub fn count_set(&self) -> usize {
        match &self.repr {
            ChunkRepr::Uniform(true) => self.volume(),
            ChunkRepr::Uniform(false) => 0,
            ChunkRepr::Dense(block) => block.values.iter().filter(|&&v| v).count(),
        }
    }

    /// The first set voxel in axis-major scan order.
    #[must_use]
    pub fn first_set(&self) -> Option<VoxelCoord> {
        match &self.repr {
            ChunkRepr::Uniform(true) => Some(self.position_low()),
            ChunkRepr::Uniform(false) => None,
            ChunkRepr::Dense(block) => block
                .values
                .iter()
                .position(|&v| v)
                .map(|i| self.coord_of_linear(i)),
        }
    }

    /// The first unset voxel in axis-major scan order.
    #[must_use]
    pub fn first_unset(&self) -> Option<VoxelCoord> {
        match &self.repr {
            ChunkRepr::Uniform(false) => Some(self.position_low()),
            ChunkRepr::Uniform(true) => None,
            ChunkRepr::Dense(block) => block
                .values
                .iter()
                .position(|&v| !v)
                .map(|i| self.coord_of_linear(i)),
        }
    }

    /// Iterates the global coordinates of all set voxels in axis-major
    /// order.
    pub fn iter_set(&self) -> impl Iterator<Item = VoxelCoord> + '_ {
        CoordRange::cube(self.position_low(), self.edge)
            .iter()
            .filter(move |&pos| self.value_at(pos))
    }
}

/// Equality is representation-independent: a uniform chunk equals a
/// dense chunk holding the same values.
impl<T: PartialEq> PartialEq for Chunk<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.index != other.index || self.edge != other.edge {
            return false;
        }
        match (&self.repr, &other.repr) {
            (ChunkRepr::Uniform(a), ChunkRepr::Uniform(b)) => a == b,
            (ChunkRepr::Uniform(value), ChunkRepr::Dense(block))
            | (ChunkRepr::Dense(block), ChunkRepr::Uniform(value)) => {
                block.values.iter().all(|v| v == value)
            }
            (ChunkRepr::Dense(a), ChunkRepr::Dense(b)) => a.values == b.values,
        }
    }
}
