//! Voxel coordinates and face directions.
//!
//! All grid math in this crate runs on [`VoxelCoord`], a 3-vector of `i32`
//! in voxel space. Chunk indices are voxel coordinates too (a voxel
//! coordinate floor-divided by the chunk edge), so one type serves both
//! levels of addressing.

// Local offsets come out of rem_euclid and are always non-negative, and
// chunk edges are far below i32::MAX, so the casts here cannot lose data.
#![allow(clippy::cast_sign_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

use crate::error::{CrustError, CrustResult};

/// A coordinate in voxel space.
///
/// # Example
///
/// ```
/// use mesh_crust::VoxelCoord;
///
/// let c = VoxelCoord::new(17, -3, 5);
/// assert_eq!(c.chunk_index(16), VoxelCoord::new(1, -1, 0));
/// assert_eq!(c.local_offset(16), [1, 13, 5]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelCoord {
    /// X component.
    pub x: i32,
    /// Y component.
    pub y: i32,
    /// Z component.
    pub z: i32,
}

impl VoxelCoord {
    /// The origin coordinate (0, 0, 0).
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Builds a coordinate from an untyped integer slice.
    ///
    /// External callers hand positions across as flat integer buffers;
    /// anything other than exactly three components is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`CrustError::InvalidIndex`] when `values` does not hold
    /// exactly three components.
    pub fn try_from_slice(values: &[i32]) -> CrustResult<Self> {
        match values {
            [x, y, z] => Ok(Self::new(*x, *y, *z)),
            _ => Err(CrustError::InvalidIndex { len: values.len() }),
        }
    }

    /// The index of the chunk containing this voxel, for chunk edge `n`.
    ///
    /// Uses floor division, so negative coordinates land in negative
    /// chunk indices rather than clustering around zero.
    #[must_use]
    pub const fn chunk_index(self, n: i32) -> Self {
        Self::new(self.x.div_euclid(n), self.y.div_euclid(n), self.z.div_euclid(n))
    }

    /// The offset of this voxel within its chunk, for chunk edge `n`.
    ///
    /// Always non-negative, component-wise below `n`.
    #[must_use]
    pub const fn local_offset(self, n: i32) -> [usize; 3] {
        [
            self.x.rem_euclid(n) as usize,
            self.y.rem_euclid(n) as usize,
            self.z.rem_euclid(n) as usize,
        ]
    }

    /// Component-wise multiplication by a scalar.
    #[must_use]
    pub const fn scaled(self, factor: i32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// The 6 face-adjacent neighbors, in [`Face::ALL`] order.
    #[must_use]
    pub fn face_neighbors(self) -> [Self; 6] {
        Face::ALL.map(|face| self + face.offset())
    }

    /// The 26 neighbors sharing a face, edge, or corner.
    #[must_use]
    pub fn all_neighbors(self) -> [Self; 26] {
        let mut out = [Self::ORIGIN; 26];
        let mut i = 0;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if dx == 0 && dy == 0 && dz == 0 {
                        continue;
                    }
                    out[i] = self + Self::new(dx, dy, dz);
                    i += 1;
                }
            }
        }
        out
    }

    /// Manhattan (L1) distance to another coordinate, saturating at
    /// `u32::MAX`.
    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        let dz = self.z.abs_diff(other.z);
        dx.saturating_add(dy).saturating_add(dz)
    }

    /// Chebyshev (L∞) distance to another coordinate.
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        self.x
            .abs_diff(other.x)
            .max(self.y.abs_diff(other.y))
            .max(self.z.abs_diff(other.z))
    }
}

impl From<(i32, i32, i32)> for VoxelCoord {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

impl From<[i32; 3]> for VoxelCoord {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl TryFrom<&[i32]> for VoxelCoord {
    type Error = CrustError;

    fn try_from(values: &[i32]) -> CrustResult<Self> {
        Self::try_from_slice(values)
    }
}

impl std::ops::Add for VoxelCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.x.wrapping_add(rhs.x),
            self.y.wrapping_add(rhs.y),
            self.z.wrapping_add(rhs.z),
        )
    }
}

impl std::ops::Sub for VoxelCoord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.x.wrapping_sub(rhs.x),
            self.y.wrapping_sub(rhs.y),
            self.z.wrapping_sub(rhs.z),
        )
    }
}

impl std::ops::Neg for VoxelCoord {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// One of the six axis-aligned faces of a voxel or chunk.
///
/// Downstream surface extraction walks chunk faces; dilation and flood
/// fill step through them. The order matches
/// [`VoxelCoord::face_neighbors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Face {
    /// Negative X.
    XNeg,
    /// Positive X.
    XPos,
    /// Negative Y.
    YNeg,
    /// Positive Y.
    YPos,
    /// Negative Z.
    ZNeg,
    /// Positive Z.
    ZPos,
}

impl Face {
    /// All six faces, negative before positive per axis.
    pub const ALL: [Self; 6] = [
        Self::XNeg,
        Self::XPos,
        Self::YNeg,
        Self::YPos,
        Self::ZNeg,
        Self::ZPos,
    ];

    /// The unit offset pointing out of this face.
    #[must_use]
    pub const fn offset(self) -> VoxelCoord {
        match self {
            Self::XNeg => VoxelCoord::new(-1, 0, 0),
            Self::XPos => VoxelCoord::new(1, 0, 0),
            Self::YNeg => VoxelCoord::new(0, -1, 0),
            Self::YPos => VoxelCoord::new(0, 1, 0),
            Self::ZNeg => VoxelCoord::new(0, 0, -1),
            Self::ZPos => VoxelCoord::new(0, 0, 1),
        }
    }

    /// The face on the opposite side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::XNeg => Self::XPos,
            Self::XPos => Self::XNeg,
            Self::YNeg => Self::YPos,
            Self::YPos => Self::YNeg,
            Self::ZNeg => Self::ZPos,
            Self::ZPos => Self::ZNeg,
        }
    }

    /// The axis this face is perpendicular to (0 = x, 1 = y, 2 = z).
    #[must_use]
    pub const fn axis(self) -> usize {
        match self {
            Self::XNeg | Self::XPos => 0,
            Self::YNeg | Self::YPos => 1,
            Self::ZNeg | Self::ZPos => 2,
        }
    }
}
