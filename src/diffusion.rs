//! Jacobi relaxation of a scalar diffusion field over a crust volume.
//!
//! The field starts at 1.0 everywhere, with model voxels pinned to 0.0.
//! Each iteration replaces every voxel of every resident chunk with the
//! 1/7-weighted sum of itself and its six face neighbors, computed
//! against the previous iteration's field (Jacobi), so chunk updates
//! are independent and run in parallel. Pinned zeros are reinstated
//! after every pass, and everything outside the crust is forced back to
//! 1.0 at the end.

// Pinned voxels hold an exact 0.0 written into the field, so bitwise
// comparison is the correct pin test.
#![allow(clippy::float_cmp)]

use std::fmt;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::chunk::DenseBlock;
use crate::coord::VoxelCoord;
use crate::error::{CrustError, CrustResult};
use crate::grid::ChunkGrid;

/// Tuning knobs for diffusion relaxation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffusionParams {
    /// Number of relaxation iterations.
    pub iterations: usize,
}

impl Default for DiffusionParams {
    fn default() -> Self {
        Self { iterations: 3 }
    }
}

impl DiffusionParams {
    /// Sets the iteration count.
    #[must_use]
    pub const fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }
}

/// Output of a diffusion run.
#[derive(Debug, Clone)]
pub struct DiffusionResult {
    /// The relaxed scalar field. Model voxels read 0.0, space outside
    /// the crust reads 1.0.
    pub field: ChunkGrid<f64>,
    /// Iterations performed.
    pub iterations: usize,
    /// Number of voxels pinned to 0.0.
    pub pinned_voxels: usize,
    /// Resident chunks in the final field.
    pub chunk_count: usize,
}

impl fmt::Display for DiffusionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "relaxed {} chunks over {} iterations, {} pinned voxels",
            self.chunk_count, self.iterations, self.pinned_voxels
        )
    }
}

/// Relaxes a diffusion field over the crust volume.
///
/// Model voxels act as 0.0 sources and stay pinned across iterations;
/// the rest of the field drifts between the sources and the implicit
/// 1.0 exterior. Values stay within `[0, 1]` throughout. Both grids
/// must share a chunk size.
///
/// # Errors
///
/// Returns [`CrustError::ChunkSizeMismatch`] when `crust` and `model`
/// disagree on chunk size.
pub fn diffuse(
    crust: &ChunkGrid<bool>,
    model: &ChunkGrid<bool>,
    params: &DiffusionParams,
) -> CrustResult<DiffusionResult> {
    if crust.chunk_size() != model.chunk_size() {
        return Err(CrustError::ChunkSizeMismatch {
            expected: crust.chunk_size(),
            actual: model.chunk_size(),
        });
    }
    let mut field = crust.like(1.0f64);
    field.set_where(crust, 1.0);
    field.set_where(model, 0.0);
    let pinned_voxels = model.count_set();
    let edge = field.chunk_size();

    for iteration in 0..params.iterations {
        let indices = field.sorted_chunk_indices();
        let updated: Vec<(VoxelCoord, DenseBlock<f64>)> = indices
            .par_iter()
            .filter_map(|&index| {
                let chunk = field.chunk_by_index(index)?;
                let padded = chunk.padded(&field, 1);
                let mut out = DenseBlock::filled(edge, 1.0);
                for i in 0..edge {
                    for j in 0..edge {
                        for k in 0..edge {
                            if chunk.value_at_local([i, j, k]) == 0.0 {
                                out.set([i, j, k], 0.0);
                                continue;
                            }
                            let sum = padded.value_at([i + 1, j + 1, k + 1])
                                + padded.value_at([i, j + 1, k + 1])
                                + padded.value_at([i + 2, j + 1, k + 1])
                                + padded.value_at([i + 1, j, k + 1])
                                + padded.value_at([i + 1, j + 2, k + 1])
                                + padded.value_at([i + 1, j + 1, k])
                                + padded.value_at([i + 1, j + 1, k + 2]);
                            out.set([i, j, k], sum / 7.0);
                        }
                    }
                }
                Some((index, out))
            })
            .collect();
        for (index, block) in updated {
            field.ensure_chunk(index).set_block(block)?;
        }
        debug!(iteration, "diffusion iteration complete");
    }

    // Space outside the crust reads as fully exterior.
    field.set_where(&!crust, 1.0);

    let chunk_count = field.chunk_count();
    info!(
        iterations = params.iterations,
        chunk_count, pinned_voxels, "diffusion field relaxed"
    );
    Ok(DiffusionResult {
        field,
        iterations: params.iterations,
        pinned_voxels,
        chunk_count,
    })
}
