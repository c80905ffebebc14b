//! Watertight voxel crust reconstruction for noisy point-cloud scans.
//!
//! This crate turns a raw surface scan into a closed voxel shell (the
//! *crust*) plus a scalar diffusion field over it, the inputs that
//! downstream surface extraction works from:
//!
//! - **Scaling** - Normalize a point cloud into voxel space
//! - **Voxelization** - Floor points into a sparse chunked occupancy grid
//! - **Crust growth** - Dilate the shell until its complement collapses
//!   to the exterior alone, with bounded rollback to the thinnest
//!   adequate shell
//! - **Diffusion** - Relax a 0-to-1 scalar field between the model
//!   surface and the exterior
//!
//! Storage is a sparse map of fixed-size chunks, so unbounded, sparsely
//! populated integer domains stay cheap: reads in absent chunks return
//! a fill value without allocating, and uniform chunks store one value
//! for all of their voxels.
//!
//! # Quick Start
//!
//! ```
//! use mesh_crust::{CrustParams, CrustStatus, DiffusionParams};
//! use mesh_crust::{diffuse, generate_crust, scale_model, voxelize};
//! use nalgebra::Point3;
//!
//! // Eight corners of a unit cube, standing in for a real scan.
//! let cloud: Vec<Point3<f64>> = (0..8)
//!     .map(|i| {
//!         Point3::new(
//!             f64::from(i & 1),
//!             f64::from((i >> 1) & 1),
//!             f64::from((i >> 2) & 1),
//!         )
//!     })
//!     .collect();
//!
//! // Normalize to a 4-voxel resolution and voxelize.
//! let scaled = scale_model(&cloud, 4.0)?;
//! let model = voxelize(&scaled.points, 8)?;
//!
//! // Grow the crust, then relax a diffusion field over it.
//! let result = generate_crust(&model, &CrustParams::default())?;
//! assert_eq!(result.status, CrustStatus::Converged);
//!
//! let diffusion = diffuse(&result.crust, &model, &DiffusionParams::default())?;
//! assert!(diffusion.field.iter().all(|(_, v)| (0.0..=1.0).contains(&v)));
//! # Ok::<(), mesh_crust::CrustError>(())
//! ```
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`coord`] | Voxel coordinates and face directions |
//! | [`range`] | Clipped axis spans and 3-D iteration order |
//! | [`index_map`] | Sparse coordinate map with cached bounds |
//! | [`chunk`] | Fixed-size voxel blocks, uniform or dense |
//! | [`grid`] | Sparse chunked grids over unbounded space |
//! | [`fill`] | Flood fill and component labeling |
//! | [`dilate`] | Morphological shell growth |
//! | [`crust`] | The crust convergence loop |
//! | [`diffusion`] | Jacobi diffusion relaxation |
//! | [`model`] | Point-cloud scaling and voxelization |
//! | [`error`] | Error taxonomy |

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![allow(clippy::module_name_repetitions)]
// Allow certain pedantic lints that are too strict for this crate
#![allow(clippy::missing_const_for_fn)] // Not all functions benefit from const
#![allow(clippy::needless_range_loop)] // Stencil loops read clearer with indices
#![allow(clippy::redundant_closure_for_method_calls)] // Closures keep call sites uniform

pub mod chunk;
pub mod coord;
pub mod crust;
pub mod diffusion;
pub mod dilate;
pub mod error;
pub mod fill;
pub mod grid;
pub mod index_map;
pub mod model;
pub mod range;

// Re-export main types at crate root for convenience
pub use chunk::{Chunk, DenseBlock};
pub use coord::{Face, VoxelCoord};
pub use crust::{CrustGenerationResult, CrustParams, CrustStatus, generate_crust};
pub use diffusion::{DiffusionParams, DiffusionResult, diffuse};
pub use dilate::dilate;
pub use error::{CrustError, CrustResult};
pub use fill::{
    ComponentLabeling, FilledRegion, exterior_seed, first_open_voxel, flood_fill_at,
    label_components,
};
pub use grid::ChunkGrid;
pub use index_map::CoordMap;
pub use model::{ScaledModel, scale_model, voxelize};
pub use range::{AxisRange, AxisSelect, CoordRange, CoordRangeIter, GridBounds};

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp)]

    use nalgebra::Point3;

    use super::*;

    #[test]
    fn test_cube_scan_pipeline() {
        let cloud: Vec<Point3<f64>> = (0..8)
            .map(|i| {
                Point3::new(
                    f64::from(i & 1),
                    f64::from((i >> 1) & 1),
                    f64::from((i >> 2) & 1),
                )
            })
            .collect();

        let scaled = scale_model(&cloud, 4.0).unwrap();
        let model = voxelize(&scaled.points, 8).unwrap();
        assert_eq!(model.count_set(), 8);

        let result = generate_crust(&model, &CrustParams::default()).unwrap();
        assert_eq!(result.status, CrustStatus::Converged);
        for pos in model.iter_set() {
            assert!(result.crust.get(pos));
        }

        let diffusion = diffuse(&result.crust, &model, &DiffusionParams::default()).unwrap();
        assert_eq!(diffusion.field.get(VoxelCoord::new(0, 0, 0)), 0.0);
        assert_eq!(diffusion.field.get(VoxelCoord::new(100, 100, 100)), 1.0);
        assert_eq!(diffusion.pinned_voxels, 8);
    }

    #[test]
    fn test_pipeline_rejects_degenerate_input() {
        assert!(matches!(
            scale_model(&[], 16.0),
            Err(CrustError::EmptyPointCloud)
        ));
        let empty = ChunkGrid::try_new(8, false).unwrap();
        assert!(matches!(
            generate_crust(&empty, &CrustParams::default()),
            Err(CrustError::EmptyModel)
        ));
    }
}
