//! Iterative crust growth with bounded rollback.
//!
//! The converger alternates component labeling ([`crate::fill`]) and
//! one-voxel dilation until the shell's complement collapses to the
//! exterior alone, keeping a bounded FIFO of pre-growth snapshots so
//! the result can be rolled back to the thinnest shell known to work.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, info, warn};

use crate::dilate::dilate;
use crate::error::{CrustError, CrustResult};
use crate::fill::label_components;
use crate::grid::ChunkGrid;

/// Tuning knobs for crust generation.
///
/// # Example
///
/// ```
/// use mesh_crust::CrustParams;
///
/// let params = CrustParams::default().with_max_steps(4).with_revert_steps(2);
/// assert_eq!(params.max_steps, 4);
/// assert_eq!(params.revert_steps, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrustParams {
    /// Maximum number of dilation steps before giving up.
    pub max_steps: usize,
    /// Number of pre-growth snapshots retained for rollback. Zero
    /// disables rollback entirely.
    pub revert_steps: usize,
    /// Cap on complement components labeled per pass. A pass cut short
    /// by the cap never counts as converged.
    pub max_components: usize,
}

impl Default for CrustParams {
    fn default() -> Self {
        Self {
            max_steps: 10,
            revert_steps: 5,
            max_components: 5,
        }
    }
}

impl CrustParams {
    /// A small step budget for quick passes over large scans.
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            max_steps: 3,
            revert_steps: 5,
            max_components: 5,
        }
    }

    /// Sets the dilation step budget.
    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sets the rollback history depth.
    #[must_use]
    pub const fn with_revert_steps(mut self, revert_steps: usize) -> Self {
        self.revert_steps = revert_steps;
        self
    }

    /// Sets the per-pass component cap.
    #[must_use]
    pub const fn with_max_components(mut self, max_components: usize) -> Self {
        self.max_components = max_components;
        self
    }
}

/// How a crust generation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrustStatus {
    /// The complement collapsed to the exterior alone.
    Converged,
    /// The step budget ran out with pockets still open.
    Exhausted,
}

impl fmt::Display for CrustStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converged => write!(f, "converged"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Output of a crust generation run.
#[derive(Debug, Clone)]
pub struct CrustGenerationResult {
    /// The selected crust shell.
    pub crust: ChunkGrid<bool>,
    /// Whether the run converged or exhausted its budget.
    pub status: CrustStatus,
    /// Dilation steps performed.
    pub steps: usize,
    /// Complement component count of the last labeling pass.
    pub components: usize,
}

impl fmt::Display for CrustGenerationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} after {} steps ({} complement components, {} crust voxels)",
            self.status,
            self.steps,
            self.components,
            self.crust.count_set()
        )
    }
}

/// Grows a watertight crust shell around a voxelized model.
///
/// The shell starts as a copy of the model occupancy padded with one
/// ring of empty chunks. Each step labels the complement: a complete
/// labeling finding one component means the shell is closed and the run
/// converges. Open pockets, or a pass cut short by the component cap,
/// keep it growing: a snapshot is pushed and the shell dilates by one
/// voxel. Both outcomes return the most recent snapshot rather than the
/// current shell — a pass's labeling certifies the shell of the pass
/// before it, so the snapshot is the thinnest shell known adequate.
/// With no history (first-pass convergence, or `revert_steps` 0) the
/// current shell is returned as is.
///
/// Budget exhaustion is reported as [`CrustStatus::Exhausted`] on the
/// result, not as an error.
///
/// # Example
///
/// ```
/// use mesh_crust::{ChunkGrid, CrustParams, CrustStatus, VoxelCoord, generate_crust};
///
/// let mut model = ChunkGrid::try_new(8, false)?;
/// for x in 0..2 {
///     for y in 0..2 {
///         for z in 0..2 {
///             model.set(VoxelCoord::new(x, y, z), true);
///         }
///     }
/// }
/// let result = generate_crust(&model, &CrustParams::default())?;
/// assert_eq!(result.status, CrustStatus::Converged);
/// assert_eq!(result.steps, 0);
/// # Ok::<(), mesh_crust::CrustError>(())
/// ```
///
/// # Errors
///
/// Returns [`CrustError::EmptyModel`] when the model holds no set
/// voxels; propagates labeling errors.
pub fn generate_crust(
    model: &ChunkGrid<bool>,
    params: &CrustParams,
) -> CrustResult<CrustGenerationResult> {
    if !model.any() {
        return Err(CrustError::EmptyModel);
    }

    let mut crust = model.clone();
    crust.pad_chunks(1);
    let mut history: VecDeque<ChunkGrid<bool>> = VecDeque::with_capacity(params.revert_steps);
    let mut steps = 0usize;
    let mut components = 0usize;

    loop {
        if steps >= params.max_steps {
            warn!(steps, components, "step budget exhausted before the crust closed");
            return Ok(CrustGenerationResult {
                crust: history.pop_back().unwrap_or(crust),
                status: CrustStatus::Exhausted,
                steps,
                components,
            });
        }

        let labeling = label_components(&crust, params.max_components)?;
        components = labeling.components;
        debug!(step = steps, %labeling, "labeled current shell");

        if labeling.components == 1 && !labeling.truncated {
            info!(steps, "crust converged to a watertight shell");
            return Ok(CrustGenerationResult {
                crust: history.pop_back().unwrap_or(crust),
                status: CrustStatus::Converged,
                steps,
                components,
            });
        }

        if params.revert_steps > 0 {
            if history.len() == params.revert_steps {
                history.pop_front();
            }
            history.push_back(crust.clone());
        }
        crust = dilate(&crust);
        steps += 1;
    }
}
