//! Morphological dilation of boolean voxel grids.

use tracing::debug;

use crate::grid::ChunkGrid;

/// Grows a boolean grid by one voxel along the six face directions.
///
/// Every set voxel stays set and additionally sets its six face
/// neighbors, materializing neighbor chunks where the growth crosses a
/// chunk border. The input is not modified.
#[must_use]
pub fn dilate(grid: &ChunkGrid<bool>) -> ChunkGrid<bool> {
    let mut out = grid.clone();
    for pos in grid.iter_set() {
        for neighbor in pos.face_neighbors() {
            out.set(neighbor, true);
        }
    }
    debug!(
        before = grid.count_set(),
        after = out.count_set(),
        "dilated voxel grid"
    );
    out
}
