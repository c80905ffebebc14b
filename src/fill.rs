//! Flood fill and connected-component labeling over chunk grids.
//!
//! Fills are 6-connected and bounded to resident chunks: a voxel only
//! counts as open when its chunk is materialized and holds `true`
//! there. Labeling runs repeated fills over the complement of a shell,
//! seeding the first pass from the resident hull so the exterior is
//! discovered before any enclosed pocket.

use std::collections::VecDeque;
use std::fmt;

use hashbrown::HashSet;
use tracing::{debug, warn};

use crate::coord::VoxelCoord;
use crate::error::{CrustError, CrustResult};
use crate::grid::ChunkGrid;

/// The set of voxels claimed by one flood fill.
#[derive(Debug, Clone)]
pub struct FilledRegion {
    /// Claimed voxels, `true` where the fill reached.
    pub voxels: ChunkGrid<bool>,
    /// Number of claimed voxels.
    pub voxel_count: usize,
}

impl fmt::Display for FilledRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} voxels claimed", self.voxel_count)
    }
}

/// Flood-fills the open region of `mask` reachable from `seed` through
/// face adjacency.
///
/// The fill never escapes the mask's resident chunks, regardless of the
/// mask's fill value. `seed` must be an open voxel.
///
/// # Errors
///
/// Returns [`CrustError::EmptyMask`] when the mask holds no open
/// voxels.
pub fn flood_fill_at(seed: VoxelCoord, mask: &ChunkGrid<bool>) -> CrustResult<FilledRegion> {
    if !mask.any() {
        return Err(CrustError::EmptyMask);
    }
    let open = |pos: VoxelCoord| mask.chunk_at(pos).is_some_and(|chunk| chunk.value_at(pos));
    debug_assert!(open(seed), "flood-fill seed {seed:?} must be an open voxel");

    let mut claimed = mask.like(false);
    let mut visited = HashSet::new();
    let mut frontier = VecDeque::new();
    visited.insert(seed);
    frontier.push_back(seed);
    let mut voxel_count = 0usize;
    while let Some(pos) = frontier.pop_front() {
        claimed.set(pos, true);
        voxel_count += 1;
        for neighbor in pos.face_neighbors() {
            if open(neighbor) && visited.insert(neighbor) {
                frontier.push_back(neighbor);
            }
        }
    }
    debug!(seed = ?seed, voxels = voxel_count, "flood fill complete");
    Ok(FilledRegion {
        voxels: claimed,
        voxel_count,
    })
}

/// Picks a seed on the resident hull of an open-voxel grid.
///
/// Prefers the minimum corner of a fully open hull chunk, which is
/// guaranteed to lie outside any closed shell. Falls back to the first
/// open voxel found in any hull chunk. Returns `None` when no hull
/// chunk holds an open voxel.
#[must_use]
pub fn exterior_seed(open: &ChunkGrid<bool>) -> Option<VoxelCoord> {
    for chunk in open.iter_hull() {
        if chunk.uniform_value() == Some(true) {
            return Some(chunk.position_low());
        }
    }
    for chunk in open.iter_hull() {
        if let Some(pos) = chunk.first_set() {
            return Some(pos);
        }
    }
    None
}

/// The first open voxel in ascending chunk order, scanning each chunk
/// axis-major.
#[must_use]
pub fn first_open_voxel(mask: &ChunkGrid<bool>) -> Option<VoxelCoord> {
    mask.sorted_chunk_indices()
        .into_iter()
        .filter_map(|index| mask.chunk_by_index(index))
        .find_map(|chunk| chunk.first_set())
}

/// Connected-component labels for a shell's complement.
///
/// Shell voxels carry label 1. Complement components carry labels 2, 3,
/// … in discovery order, with the exterior labeled first. Unclaimed
/// voxels stay 0.
#[derive(Debug, Clone)]
pub struct ComponentLabeling {
    /// Per-voxel labels.
    pub labels: ChunkGrid<i32>,
    /// Number of complement components labeled.
    pub components: usize,
    /// The seed voxel of each component, in label order.
    pub seeds: Vec<VoxelCoord>,
    /// Whether labeling stopped at the component cap with open voxels
    /// remaining.
    pub truncated: bool,
}

impl fmt::Display for ComponentLabeling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} complement components{}",
            self.components,
            if self.truncated { " (truncated)" } else { "" }
        )
    }
}

/// Labels the connected components of a shell's complement within the
/// shell's resident chunks.
///
/// A closed, watertight shell leaves exactly one complement component:
/// the exterior. Each additional component is an enclosed pocket the
/// shell has not yet sealed off from growth. At most `max_components`
/// components are labeled; when open voxels remain past the cap the
/// result is marked truncated.
///
/// # Errors
///
/// Propagates [`CrustError::EmptyMask`] from the underlying fills.
pub fn label_components(
    shell: &ChunkGrid<bool>,
    max_components: usize,
) -> CrustResult<ComponentLabeling> {
    let mut labels = shell.map(i32::from);
    let mut mask = shell.map(|occupied| !occupied);

    let mut seeds = Vec::new();
    let mut components = 0usize;
    let mut truncated = false;
    let mut label = 2i32;
    let mut next_seed = exterior_seed(&mask);
    while let Some(seed) = next_seed {
        if components == max_components {
            truncated = true;
            warn!(
                max_components,
                "component cap reached before the complement was exhausted"
            );
            break;
        }
        let region = flood_fill_at(seed, &mask)?;
        labels.set_where(&region.voxels, label);
        mask.set_where(&region.voxels, false);
        seeds.push(seed);
        debug!(label, voxels = region.voxel_count, "labeled complement component");
        components += 1;
        label += 1;
        next_seed = first_open_voxel(&mask);
    }

    Ok(ComponentLabeling {
        labels,
        components,
        seeds,
        truncated,
    })
}
