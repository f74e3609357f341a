//! Chunk-grouped index of visible voxels with lazy reconciliation.
//!
//! Entries are appended whenever a voxel is promoted to `Visible` and never
//! removed individually. A demotion leaves a stale entry behind and must flag
//! the chunk with [`VisibilityIndex::mark_removal_touched`]; [`VisibilityIndex::reconcile`]
//! later rebuilds exactly those chunks from the dense store.

use std::collections::{HashMap, HashSet};

use super::dense::DenseStore;
use super::geometry::GridGeometry;
use super::voxel::{Voxel, VoxelState};

/// Counters for diagnostics and logging
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisibilityStats {
    pub visible_chunks: usize,
    pub entries: usize,
    pub touched_chunks: usize,
    pub dirty_chunks: usize,
}

/// Sparse visibility bookkeeping for one volume
#[derive(Debug)]
pub struct VisibilityIndex {
    geometry: GridGeometry,
    /// Chunk id -> voxel snapshots, possibly stale until reconciled
    visible_by_chunk: HashMap<i32, Vec<Voxel>>,
    /// Chunks holding at least one stale entry
    dirty_with_removal: HashSet<i32>,
    /// Chunks touched since the last cycle reset
    touched_this_cycle: HashSet<i32>,
    /// Chunks believed to contain at least one visible voxel
    visible_chunks: HashSet<i32>,
}

impl VisibilityIndex {
    /// Create an empty index for the given layout
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            visible_by_chunk: HashMap::new(),
            dirty_with_removal: HashSet::new(),
            touched_this_cycle: HashSet::new(),
            visible_chunks: HashSet::new(),
        }
    }

    pub(crate) fn set_geometry(&mut self, geometry: GridGeometry) {
        self.geometry = geometry;
    }

    /// Record a voxel that was just promoted to `Visible`
    pub fn mark_visible(&mut self, voxel: Voxel) {
        let chunk = self.geometry.chunk_of(voxel.x, voxel.y, voxel.z);
        self.visible_by_chunk.entry(chunk).or_default().push(voxel);
        self.touched_this_cycle.insert(chunk);
        self.visible_chunks.insert(chunk);
    }

    /// Mark a chunk as touched by the current edit batch
    pub fn mark_touched(&mut self, chunk: i32) {
        self.touched_this_cycle.insert(chunk);
    }

    /// Mark a chunk as touched and holding stale entries
    pub fn mark_removal_touched(&mut self, chunk: i32) {
        self.touched_this_cycle.insert(chunk);
        self.dirty_with_removal.insert(chunk);
    }

    /// Merge chunk lists produced by parallel tasks
    pub fn merge_touched<I: IntoIterator<Item = i32>>(&mut self, touched: I, with_removal: bool) {
        for chunk in touched {
            if with_removal {
                self.mark_removal_touched(chunk);
            } else {
                self.mark_touched(chunk);
            }
        }
    }

    /// Drop stale entries from every dirty chunk.
    ///
    /// Each entry is re-read from the dense store; only voxels still `Visible`
    /// survive, deduplicated by position and refreshed to the live snapshot.
    /// Chunks left empty are removed from the visible set. Returns the number
    /// of entries dropped.
    pub fn reconcile(&mut self, store: &DenseStore) -> usize {
        let mut dropped = 0;

        for &chunk in &self.dirty_with_removal {
            let Some(entries) = self.visible_by_chunk.get_mut(&chunk) else {
                self.visible_chunks.remove(&chunk);
                continue;
            };

            let before = entries.len();
            let mut seen = HashSet::with_capacity(before);
            let rebuilt: Vec<Voxel> = entries
                .iter()
                .filter_map(|entry| {
                    let live = store.get(entry.x, entry.y, entry.z);
                    (live.state == VoxelState::Visible && seen.insert(live.position())).then_some(live)
                })
                .collect();
            dropped += before - rebuilt.len();

            if rebuilt.is_empty() {
                self.visible_by_chunk.remove(&chunk);
                self.visible_chunks.remove(&chunk);
            } else {
                *entries = rebuilt;
            }
        }

        if dropped > 0 {
            log::debug!(
                "Reconciled {} chunks, dropped {} stale entries",
                self.dirty_with_removal.len(),
                dropped
            );
        }
        dropped
    }

    /// Forget the current cycle's touched and dirty chunk sets
    pub fn reset_cycle(&mut self) {
        self.touched_this_cycle.clear();
        self.dirty_with_removal.clear();
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.visible_by_chunk.clear();
        self.visible_chunks.clear();
        self.reset_cycle();
    }

    /// Chunks believed to contain visible voxels
    pub fn visible_chunks(&self) -> &HashSet<i32> {
        &self.visible_chunks
    }

    /// Visible voxel snapshots of a chunk (empty for unknown chunks)
    pub fn chunk_voxels(&self, chunk: i32) -> &[Voxel] {
        self.visible_by_chunk
            .get(&chunk)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Chunks touched since the last cycle reset
    pub fn touched_chunks(&self) -> &HashSet<i32> {
        &self.touched_this_cycle
    }

    /// Chunks awaiting reconciliation
    pub fn dirty_chunks(&self) -> &HashSet<i32> {
        &self.dirty_with_removal
    }

    pub fn is_chunk_dirty(&self, chunk: i32) -> bool {
        self.dirty_with_removal.contains(&chunk)
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty_with_removal.is_empty()
    }

    pub fn stats(&self) -> VisibilityStats {
        VisibilityStats {
            visible_chunks: self.visible_chunks.len(),
            entries: self.visible_by_chunk.values().map(Vec::len).sum(),
            touched_chunks: self.touched_this_cycle.len(),
            dirty_chunks: self.dirty_with_removal.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    fn setup() -> (DenseStore, VisibilityIndex) {
        let geometry = GridGeometry::new(IVec3::new(8, 4, 4), 1.0, 4).unwrap();
        let mut store = DenseStore::new(geometry);
        store.par_fill(|p| Voxel::new(p.x, p.y, p.z, 7, VoxelState::Solid));
        (store, VisibilityIndex::new(geometry))
    }

    fn promote(store: &mut DenseStore, index: &mut VisibilityIndex, x: i32, y: i32, z: i32) {
        let v = store.get(x, y, z).with_state(VoxelState::Visible);
        store.set(x, y, z, v);
        index.mark_visible(v);
    }

    #[test]
    fn test_mark_visible_groups_by_chunk() {
        let (mut store, mut index) = setup();
        promote(&mut store, &mut index, 0, 0, 0);
        promote(&mut store, &mut index, 5, 0, 0);

        assert_eq!(index.visible_chunks().len(), 2);
        assert_eq!(index.chunk_voxels(0).len(), 1);
        assert_eq!(index.chunk_voxels(1)[0].x, 5);
        assert!(index.touched_chunks().contains(&1));
        assert!(!index.has_dirty());
    }

    #[test]
    fn test_reconcile_drops_stale_and_empty_chunks() {
        let (mut store, mut index) = setup();
        promote(&mut store, &mut index, 0, 0, 0);
        promote(&mut store, &mut index, 1, 0, 0);
        promote(&mut store, &mut index, 5, 0, 0);

        store.get_mut(0, 0, 0).state = VoxelState::Removed;
        store.get_mut(5, 0, 0).state = VoxelState::Solid;
        index.mark_removal_touched(0);
        index.mark_removal_touched(1);

        assert_eq!(index.reconcile(&store), 2);
        assert_eq!(index.chunk_voxels(0).len(), 1);
        assert_eq!(index.chunk_voxels(0)[0].x, 1);
        assert!(index.chunk_voxels(1).is_empty());
        assert!(!index.visible_chunks().contains(&1));
        assert!(index.visible_chunks().contains(&0));
    }

    #[test]
    fn test_untouched_chunks_are_trusted() {
        let (mut store, mut index) = setup();
        promote(&mut store, &mut index, 0, 0, 0);
        store.get_mut(0, 0, 0).state = VoxelState::Removed;

        // Not flagged, so the stale entry survives
        index.reconcile(&store);
        assert_eq!(index.chunk_voxels(0).len(), 1);
    }

    #[test]
    fn test_reconcile_dedupes_and_refreshes() {
        let (mut store, mut index) = setup();
        promote(&mut store, &mut index, 2, 1, 1);
        promote(&mut store, &mut index, 2, 1, 1);
        store.get_mut(2, 1, 1).color = 99;
        index.mark_removal_touched(0);

        index.reconcile(&store);
        assert_eq!(index.chunk_voxels(0), &[store.get(2, 1, 1)]);
        assert_eq!(index.chunk_voxels(0)[0].color, 99);
    }

    #[test]
    fn test_reset_cycle() {
        let (mut store, mut index) = setup();
        promote(&mut store, &mut index, 0, 0, 0);
        index.mark_removal_touched(0);
        index.reset_cycle();

        let stats = index.stats();
        assert_eq!(stats.touched_chunks, 0);
        assert_eq!(stats.dirty_chunks, 0);
        assert_eq!(stats.visible_chunks, 1);
        assert_eq!(stats.entries, 1);
    }
}
