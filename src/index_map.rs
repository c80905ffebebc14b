//! Sparse mapping from voxel coordinates to values with cached bounds.
//!
//! The map tracks the bounding box of its keys as it goes: insertions
//! grow the cached bounds incrementally, removals only mark the cache
//! stale. A stale cache is never trusted — bounds queries fall back to a
//! full key rescan until the next insertion rebuilds the cache.

use hashbrown::HashMap;

use crate::coord::VoxelCoord;
use crate::error::{CrustError, CrustResult};
use crate::range::{AxisSelect, CoordRange, GridBounds};

/// Sparse 3-D map with running bounds.
///
/// # Example
///
/// ```
/// use mesh_crust::{CoordMap, VoxelCoord};
///
/// let mut map = CoordMap::new();
/// map.insert(VoxelCoord::new(0, 0, 0), "a");
/// map.insert(VoxelCoord::new(4, 2, 0), "b");
///
/// let bounds = map.bounds().unwrap();
/// assert_eq!(bounds.min, VoxelCoord::new(0, 0, 0));
/// assert_eq!(bounds.max, VoxelCoord::new(4, 2, 0));
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordMap<T> {
    entries: HashMap<VoxelCoord, T>,
    cached_bounds: Option<GridBounds>,
    bounds_dirty: bool,
}

impl<T> Default for CoordMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CoordMap<T> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            cached_bounds: None,
            bounds_dirty: false,
        }
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes all entries and forgets the cached bounds.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cached_bounds = None;
        self.bounds_dirty = false;
    }

    /// Whether an entry is stored at `coord`.
    #[must_use]
    pub fn contains(&self, coord: VoxelCoord) -> bool {
        self.entries.contains_key(&coord)
    }

    /// Returns the value stored at `coord`.
    #[must_use]
    pub fn get(&self, coord: VoxelCoord) -> Option<&T> {
        self.entries.get(&coord)
    }

    /// Returns a mutable reference to the value stored at `coord`.
    pub fn get_mut(&mut self, coord: VoxelCoord) -> Option<&mut T> {
        self.entries.get_mut(&coord)
    }

    /// Inserts a value, returning the previous one if present.
    ///
    /// A clean bounds cache grows incrementally; a stale one is rebuilt
    /// by a full rescan first.
    pub fn insert(&mut self, coord: VoxelCoord, value: T) -> Option<T> {
        self.note_insert(coord);
        self.entries.insert(coord, value)
    }

    /// Removes the entry at `coord`.
    ///
    /// Marks the cached bounds stale; the next bounds query rescans.
    pub fn remove(&mut self, coord: VoxelCoord) -> Option<T> {
        let removed = self.entries.remove(&coord);
        if removed.is_some() {
            self.bounds_dirty = true;
        }
        removed
    }

    /// Returns the value at `coord`, inserting the factory's product
    /// first when absent. Never overwrites an existing entry.
    pub fn get_or_insert_with<F>(&mut self, coord: VoxelCoord, factory: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        self.note_insert(coord);
        self.entries.entry(coord).or_insert_with(factory)
    }

    /// Fetches the values for a list of coordinates, skipping absent
    /// entries.
    #[must_use]
    pub fn get_many(&self, coords: &[VoxelCoord]) -> Vec<&T> {
        coords.iter().filter_map(|c| self.entries.get(c)).collect()
    }

    /// Fetches the values for a list of coordinates, failing on the
    /// first absent entry.
    ///
    /// # Errors
    ///
    /// Returns [`CrustError::MissingIndex`] naming the first coordinate
    /// with no stored value.
    pub fn try_get_many(&self, coords: &[VoxelCoord]) -> CrustResult<Vec<&T>> {
        coords
            .iter()
            .map(|&c| {
                self.entries
                    .get(&c)
                    .ok_or(CrustError::MissingIndex { index: c })
            })
            .collect()
    }

    /// The bounding box of all stored keys, or `None` when empty.
    ///
    /// Costs a full key rescan while the cache is stale (after a
    /// removal); otherwise reads the cache.
    #[must_use]
    pub fn bounds(&self) -> Option<GridBounds> {
        if self.bounds_dirty {
            Self::scan_bounds(&self.entries)
        } else {
            self.cached_bounds
        }
    }

    /// Visits stored values within a 3-axis selection resolved against
    /// the current bounds.
    ///
    /// Wildcard axes span the full known extent. With `skip_missing`,
    /// coordinates without an entry are silently skipped; otherwise the
    /// first one fails the call. A fully wildcard selection visits the
    /// stored entries directly in key order and cannot fail. An empty
    /// map yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`CrustError::MissingIndex`] when `skip_missing` is false
    /// and the selection visits a coordinate with no entry.
    pub fn sliced(&self, selects: [AxisSelect; 3], skip_missing: bool) -> CrustResult<Vec<&T>> {
        let Some(bounds) = self.bounds() else {
            return Ok(Vec::new());
        };
        if selects == [AxisSelect::All; 3] {
            let keys = self.sorted_keys();
            return Ok(keys.iter().filter_map(|k| self.entries.get(k)).collect());
        }
        let range = CoordRange::resolve(selects, bounds);
        let mut out = Vec::with_capacity(range.len().min(self.len()));
        for coord in &range {
            match self.entries.get(&coord) {
                Some(value) => out.push(value),
                None if skip_missing => {}
                None => return Err(CrustError::MissingIndex { index: coord }),
            }
        }
        Ok(out)
    }

    /// Iterates stored entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (VoxelCoord, &T)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Iterates stored entries mutably in unspecified order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (VoxelCoord, &mut T)> {
        self.entries.iter_mut().map(|(k, v)| (*k, v))
    }

    /// Iterates stored keys in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = VoxelCoord> + '_ {
        self.entries.keys().copied()
    }

    /// All stored keys in ascending order.
    #[must_use]
    pub fn sorted_keys(&self) -> Vec<VoxelCoord> {
        let mut keys: Vec<_> = self.entries.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Iterates stored values in unspecified order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    /// Iterates stored values mutably in unspecified order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.values_mut()
    }

    fn note_insert(&mut self, coord: VoxelCoord) {
        if self.bounds_dirty {
            self.cached_bounds = Self::scan_bounds(&self.entries);
            self.bounds_dirty = false;
        }
        match &mut self.cached_bounds {
            Some(bounds) => bounds.expand_to_include(coord),
            None => self.cached_bounds = Some(GridBounds::at(coord)),
        }
    }

    fn scan_bounds(entries: &HashMap<VoxelCoord, T>) -> Option<GridBounds> {
        let mut keys = entries.keys();
        let mut bounds = GridBounds::at(*keys.next()?);
        for key in keys {
            bounds.expand_to_include(*key);
        }
        Some(bounds)
    }
}

/// Equality compares entries only; the bounds cache state is not
/// observable.
impl<T: PartialEq> PartialEq for CoordMap<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}
