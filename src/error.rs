//! Error types for crust reconstruction.

use crate::coord::VoxelCoord;

/// Result type for crust operations.
pub type CrustResult<T> = Result<T, CrustError>;

/// Errors that can occur while building or querying chunked voxel data.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CrustError {
    /// An index did not decompose into exactly three integer components.
    #[error("index must have exactly 3 components, got {len}")]
    InvalidIndex {
        /// Number of components supplied.
        len: usize,
    },

    /// A strict multi-index lookup referenced an absent entry.
    #[error("no entry stored at index {index:?}")]
    MissingIndex {
        /// The index that was not found.
        index: VoxelCoord,
    },

    /// The chunk edge length must be at least 1.
    #[error("chunk size must be positive, got {0}")]
    InvalidChunkSize(usize),

    /// The target voxel resolution must be positive.
    #[error("resolution must be positive, got {0}")]
    InvalidResolution(f64),

    /// A dense block's length did not match the chunk's dimensions.
    #[error("block holds {actual} values, chunk expects {expected}")]
    BlockSizeMismatch {
        /// Number of values the chunk holds.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// Two grids combined in one operation disagree on chunk size.
    #[error("grids disagree on chunk size: {expected} vs {actual}")]
    ChunkSizeMismatch {
        /// Chunk size of the primary grid.
        expected: usize,
        /// Chunk size of the other grid.
        actual: usize,
    },

    /// Flood fill was requested on a mask with no open voxels.
    #[error("mask contains no open voxels")]
    EmptyMask,

    /// Crust generation was requested for a model with no occupied voxels.
    #[error("model grid contains no occupied voxels")]
    EmptyModel,

    /// The input point cloud contains no points.
    #[error("point cloud is empty")]
    EmptyPointCloud,

    /// All input points are coincident; the model has no spatial extent.
    #[error("point cloud has zero spatial extent")]
    DegenerateModel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_index_display() {
        let err = CrustError::InvalidIndex { len: 2 };
        assert_eq!(err.to_string(), "index must have exactly 3 components, got 2");
    }

    #[test]
    fn test_missing_index_display() {
        let err = CrustError::MissingIndex {
            index: VoxelCoord::new(1, 2, 3),
        };
        assert!(err.to_string().contains("no entry stored"));
    }

    #[test]
    fn test_invalid_chunk_size_display() {
        let err = CrustError::InvalidChunkSize(0);
        assert_eq!(err.to_string(), "chunk size must be positive, got 0");
    }

    #[test]
    fn test_block_size_mismatch_display() {
        let err = CrustError::BlockSizeMismatch {
            expected: 512,
            actual: 8,
        };
        assert_eq!(err.to_string(), "block holds 8 values, chunk expects 512");
    }

    #[test]
    fn test_chunk_size_mismatch_display() {
        let err = CrustError::ChunkSizeMismatch {
            expected: 8,
            actual: 4,
        };
        assert_eq!(err.to_string(), "grids disagree on chunk size: 8 vs 4");
    }

    #[test]
    fn test_empty_variants_display() {
        assert_eq!(CrustError::EmptyMask.to_string(), "mask contains no open voxels");
        assert_eq!(
            CrustError::EmptyModel.to_string(),
            "model grid contains no occupied voxels"
        );
        assert_eq!(CrustError::EmptyPointCloud.to_string(), "point cloud is empty");
        assert_eq!(
            CrustError::DegenerateModel.to_string(),
            "point cloud has zero spatial extent"
        );
    }
}
