//! Point-cloud normalization and voxelization.
//!
//! Raw scans arrive in arbitrary units; [`scale_model`] translates and
//! uniformly scales a cloud so its largest bounding-box extent spans a
//! requested number of voxels, and [`voxelize`] floors the scaled
//! points into a boolean occupancy grid.

// Scaled coordinates are bounded by the target resolution, so the
// float-to-i32 floor conversion cannot overflow in practice.
#![allow(clippy::cast_possible_truncation)]

use nalgebra::Point3;
use tracing::debug;

use crate::coord::VoxelCoord;
use crate::error::{CrustError, CrustResult};
use crate::grid::ChunkGrid;

/// A point cloud normalized into voxel space, with the transform needed
/// to map results back.
#[derive(Debug, Clone)]
pub struct ScaledModel {
    /// Scaled points: minimum corner at the origin, largest extent
    /// equal to the requested resolution.
    pub points: Vec<Point3<f64>>,
    /// Minimum corner of the original cloud.
    pub origin: Point3<f64>,
    /// Uniform factor applied after translation.
    pub scale: f64,
}

impl ScaledModel {
    /// Maps a voxel-space point back into the original coordinate
    /// frame.
    #[must_use]
    pub fn unscale(&self, point: Point3<f64>) -> Point3<f64> {
        Point3::new(
            point.x / self.scale + self.origin.x,
            point.y / self.scale + self.origin.y,
            point.z / self.scale + self.origin.z,
        )
    }
}

/// Normalizes a point cloud into voxel space.
///
/// Translates the cloud so its minimum corner sits at the origin, then
/// scales uniformly so the largest bounding-box extent equals
/// `resolution` voxels.
///
/// # Errors
///
/// Returns [`CrustError::EmptyPointCloud`] for an empty input,
/// [`CrustError::InvalidResolution`] for a non-positive resolution, and
/// [`CrustError::DegenerateModel`] when every point coincides.
pub fn scale_model(points: &[Point3<f64>], resolution: f64) -> CrustResult<ScaledModel> {
    let Some(first) = points.first() else {
        return Err(CrustError::EmptyPointCloud);
    };
    if resolution <= 0.0 {
        return Err(CrustError::InvalidResolution(resolution));
    }

    let mut min = *first;
    let mut max = *first;
    for point in points {
        min.x = min.x.min(point.x);
        min.y = min.y.min(point.y);
        min.z = min.z.min(point.z);
        max.x = max.x.max(point.x);
        max.y = max.y.max(point.y);
        max.z = max.z.max(point.z);
    }
    let extent = max - min;
    let largest = extent.x.max(extent.y).max(extent.z);
    if largest <= 0.0 {
        return Err(CrustError::DegenerateModel);
    }
    let scale = resolution / largest;
    let scaled = points
        .iter()
        .map(|point| {
            Point3::new(
                (point.x - min.x) * scale,
                (point.y - min.y) * scale,
                (point.z - min.z) * scale,
            )
        })
        .collect();
    debug!(points = points.len(), scale, "scaled point cloud into voxel space");
    Ok(ScaledModel {
        points: scaled,
        origin: min,
        scale,
    })
}

/// Floors points into a boolean occupancy grid.
///
/// Duplicate hits on one voxel are idempotent. An empty slice produces
/// an empty grid.
///
/// # Errors
///
/// Returns [`CrustError::InvalidChunkSize`] when `chunk_size` is zero.
pub fn voxelize(points: &[Point3<f64>], chunk_size: usize) -> CrustResult<ChunkGrid<bool>> {
    let mut grid = ChunkGrid::try_new(chunk_size, false)?;
    for point in points {
        let voxel = VoxelCoord::new(
            point.x.floor() as i32,
            point.y.floor() as i32,
            point.z.floor() as i32,
        );
        grid.set(voxel, true);
    }
    debug!(
        points = points.len(),
        voxels = grid.count_set(),
        "voxelized point cloud"
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_scale_normalizes_largest_extent() {
        let cloud = vec![
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(3.0, 6.0, 3.5),
            Point3::new(2.0, 4.0, 3.25),
        ];
        // Extents are 2 × 4 × 0.5; the y axis dominates.
        let scaled = scale_model(&cloud, 8.0).unwrap();
        assert_relative_eq!(scaled.scale, 2.0);
        assert_relative_eq!(scaled.points[0].x, 0.0);
        assert_relative_eq!(scaled.points[0].y, 0.0);
        assert_relative_eq!(scaled.points[0].z, 0.0);
        assert_relative_eq!(scaled.points[1].y, 8.0);
        assert_relative_eq!(scaled.points[1].x, 4.0);
        assert_relative_eq!(scaled.points[2].z, 0.5);
    }

    #[test]
    fn test_unscale_round_trips() {
        let cloud = vec![
            Point3::new(-1.5, 0.0, 2.0),
            Point3::new(2.5, 1.0, 7.0),
            Point3::new(0.0, -3.0, 4.0),
        ];
        let scaled = scale_model(&cloud, 32.0).unwrap();
        for (original, point) in cloud.iter().zip(&scaled.points) {
            let back = scaled.unscale(*point);
            assert_relative_eq!(back.x, original.x, epsilon = 1e-12);
            assert_relative_eq!(back.y, original.y, epsilon = 1e-12);
            assert_relative_eq!(back.z, original.z, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_scale_rejects_empty_cloud() {
        assert!(matches!(
            scale_model(&[], 16.0),
            Err(CrustError::EmptyPointCloud)
        ));
    }

    #[test]
    fn test_scale_rejects_bad_resolution() {
        let cloud = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        assert!(matches!(
            scale_model(&cloud, 0.0),
            Err(CrustError::InvalidResolution(_))
        ));
        assert!(matches!(
            scale_model(&cloud, -4.0),
            Err(CrustError::InvalidResolution(_))
        ));
    }

    #[test]
    fn test_scale_rejects_coincident_points() {
        let cloud = vec![Point3::new(1.0, 1.0, 1.0); 3];
        assert!(matches!(
            scale_model(&cloud, 16.0),
            Err(CrustError::DegenerateModel)
        ));
    }

    #[test]
    fn test_voxelize_floors_points() {
        let points = vec![
            Point3::new(0.2, 0.9, 0.0),
            Point3::new(1.7, 0.0, 2.3),
            Point3::new(-0.5, 0.0, 0.0),
        ];
        let grid = voxelize(&points, 8).unwrap();
        assert!(grid.get(VoxelCoord::new(0, 0, 0)));
        assert!(grid.get(VoxelCoord::new(1, 0, 2)));
        assert!(grid.get(VoxelCoord::new(-1, 0, 0)));
        assert_eq!(grid.count_set(), 3);
    }

    #[test]
    fn test_voxelize_duplicates_are_idempotent() {
        let points = vec![Point3::new(0.1, 0.1, 0.1), Point3::new(0.9, 0.9, 0.9)];
        let grid = voxelize(&points, 8).unwrap();
        assert_eq!(grid.count_set(), 1);
    }

    #[test]
    fn test_voxelize_rejects_zero_chunk_size() {
        assert!(matches!(
            voxelize(&[], 0),
            Err(CrustError::InvalidChunkSize(0))
        ));
    }

    #[test]
    fn test_voxelize_empty_cloud_gives_empty_grid() {
        let grid = voxelize(&[], 16).unwrap();
        assert_eq!(grid.chunk_count(), 0);
        assert!(!grid.any());
    }
}
