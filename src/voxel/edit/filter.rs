//! Bulk removal by color, parallel per chunk.

use std::collections::BTreeSet;
use std::time::Instant;

use crate::math::FACE_NEIGHBORS;
use crate::voxel::dense::DenseStore;
use crate::voxel::parallel;
use crate::voxel::visibility::VisibilityIndex;
use crate::voxel::volume_data::VolumeData;
use crate::voxel::voxel::VoxelState;

/// Arguments of the most recent filter calls
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    pub last_filter_value: u8,
    pub last_filter_range_begin: u8,
    pub last_filter_range_end: u8,
}

/// Removes every present voxel whose color matches a value or range
pub struct FilterEngine<'a> {
    data: &'a mut VolumeData,
    state: &'a mut FilterState,
}

impl<'a> FilterEngine<'a> {
    pub fn new(data: &'a mut VolumeData, state: &'a mut FilterState) -> Self {
        Self { data, state }
    }

    /// Remove voxels with exactly this color. Returns the number removed.
    pub fn filter_value(&mut self, value: u8) -> usize {
        self.state.last_filter_value = value;
        filter_by(self.data, |color| color == value)
    }

    /// Remove voxels with a color in `begin..=end`. Returns the number removed.
    pub fn filter_value_range(&mut self, begin: u8, end: u8) -> usize {
        self.state.last_filter_range_begin = begin;
        self.state.last_filter_range_end = end;
        filter_by(self.data, |color| (begin..=end).contains(&color))
    }
}

fn filter_by<F>(data: &mut VolumeData, matches: F) -> usize
where
    F: Fn(u8) -> bool + Sync + Send,
{
    let start = Instant::now();
    let (dense, visibility) = data.parts_mut();
    let geometry = *dense.geometry();

    let chunks: Vec<i32> = (0..geometry.chunk_count() as i32).collect();
    let outputs = parallel::fork_join(dense, &chunks, |&chunk, store, out| {
        geometry.for_each_in_chunk(chunk, |p| {
            let voxel = store.get(p.x, p.y, p.z);
            if !voxel.is_present() || !matches(voxel.color) {
                return;
            }
            out.write(store, p, voxel.with_state(VoxelState::Removed));
            out.touched.insert(chunk);
            if voxel.state == VoxelState::Visible {
                out.removal_touched.insert(chunk);
            }

            // Exposed solids may live across a chunk boundary
            for offset in FACE_NEIGHBORS {
                let q = p + offset;
                if geometry.contains(q.x, q.y, q.z) {
                    let neighbor_chunk = geometry.chunk_of(q.x, q.y, q.z);
                    if neighbor_chunk != chunk {
                        out.touched.insert(neighbor_chunk);
                    }
                }
            }
        });
    });
    parallel::commit(dense, &outputs);

    let removed: usize = outputs.iter().map(|out| out.writes.len()).sum();
    let mut modified = BTreeSet::new();
    let mut with_removal = BTreeSet::new();
    for out in &outputs {
        modified.extend(out.touched.iter().copied());
        with_removal.extend(out.removal_touched.iter().copied());
    }

    let exposed = rebuild_visible_voxels(dense, visibility, &modified, &with_removal);

    log::info!(
        "Filtered {} voxels across {} chunks, exposed {} in {:.1}ms",
        removed,
        modified.len(),
        exposed,
        start.elapsed().as_secs_f64() * 1000.0
    );
    removed
}

/// Promote every solid voxel in `modified` chunks that borders a removed or
/// out-of-grid cell. Chunks in `with_removal` are flagged for reconciliation.
///
/// Returns the number of voxels promoted.
pub(crate) fn rebuild_visible_voxels(
    dense: &mut DenseStore,
    visibility: &mut VisibilityIndex,
    modified: &BTreeSet<i32>,
    with_removal: &BTreeSet<i32>,
) -> usize {
    let geometry = *dense.geometry();
    let chunks: Vec<i32> = modified.iter().copied().collect();

    let outputs = parallel::fork_join(dense, &chunks, |&chunk, store, out| {
        geometry.for_each_in_chunk(chunk, |p| {
            let voxel = store.get(p.x, p.y, p.z);
            if voxel.state == VoxelState::Solid && store.borders_empty(p) {
                out.write(store, p, voxel.with_state(VoxelState::Visible));
            }
        });
    });
    parallel::commit(dense, &outputs);

    let mut promoted = 0;
    for out in &outputs {
        for &(_, voxel) in &out.writes {
            visibility.mark_visible(voxel);
            promoted += 1;
        }
    }
    visibility.merge_touched(with_removal.iter().copied(), true);
    promoted
}
