//! Fork-join execution over disjoint grid partitions.
//!
//! Tasks read the dense store through a shared reference and stage their
//! writes into a private [`TaskOutput`]. After rayon joins every task, the
//! calling thread commits the staged writes and merges the chunk lists in
//! partition order. Partitions must cover disjoint cells; debug builds
//! assert it at commit time.

use std::collections::BTreeSet;

use glam::IVec3;
use rayon::prelude::*;

use super::dense::DenseStore;
use super::voxel::Voxel;

/// Private result of one parallel task
#[derive(Debug, Default)]
pub struct TaskOutput {
    /// Staged `(linear index, new voxel)` writes, all inside the task's partition
    pub writes: Vec<(usize, Voxel)>,
    /// Chunks modified by the task
    pub touched: BTreeSet<i32>,
    /// Chunks where a visible voxel was demoted or removed
    pub removal_touched: BTreeSet<i32>,
}

impl TaskOutput {
    /// Stage a write of `voxel` to the in-range cell `p`
    #[inline]
    pub fn write(&mut self, store: &DenseStore, p: IVec3, voxel: Voxel) {
        let idx = store.geometry().index(p.x, p.y, p.z);
        self.writes.push((idx, Voxel { x: p.x, y: p.y, z: p.z, ..voxel }));
    }
}

/// Run `task` once per partition in parallel and collect the outputs in order
pub fn fork_join<P, F>(store: &DenseStore, partitions: &[P], task: F) -> Vec<TaskOutput>
where
    P: Sync,
    F: Fn(&P, &DenseStore, &mut TaskOutput) + Sync + Send,
{
    partitions
        .par_iter()
        .map(|partition| {
            let mut out = TaskOutput::default();
            task(partition, store, &mut out);
            out
        })
        .collect()
}

/// Apply every staged write to the store
pub fn commit(store: &mut DenseStore, outputs: &[TaskOutput]) {
    #[cfg(debug_assertions)]
    {
        let mut seen = std::collections::HashSet::new();
        for out in outputs {
            for &(idx, _) in &out.writes {
                debug_assert!(seen.insert(idx), "parallel partitions overlap at cell {idx}");
            }
        }
    }

    for out in outputs {
        for &(idx, voxel) in &out.writes {
            store.set_index(idx, voxel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::geometry::GridGeometry;
    use crate::voxel::voxel::VoxelState;

    #[test]
    fn test_fork_join_commit() {
        let geometry = GridGeometry::new(IVec3::new(4, 4, 4), 1.0, 2).unwrap();
        let mut store = DenseStore::new(geometry);
        store.par_fill(|p| Voxel::new(p.x, p.y, p.z, 0, VoxelState::Solid));

        // One partition per z slab
        let slabs: Vec<i32> = (0..4).collect();
        let outputs = fork_join(&store, &slabs, |&z, store, out| {
            for y in 0..4 {
                for x in 0..4 {
                    let v = store.get(x, y, z);
                    out.write(store, IVec3::new(x, y, z), Voxel { color: z as u8, ..v });
                }
            }
            out.touched.insert(store.geometry().chunk_of(0, 0, z));
        });

        assert_eq!(outputs.len(), 4);
        commit(&mut store, &outputs);
        assert_eq!(store.get(3, 3, 2).color, 2);
        assert!(outputs[3].touched.contains(&9));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "overlap")]
    fn test_overlap_detected() {
        let geometry = GridGeometry::new(IVec3::splat(2), 1.0, 2).unwrap();
        let mut store = DenseStore::new(geometry);
        let outputs = fork_join(&store, &[0, 1], |_, store, out| {
            out.write(store, IVec3::ZERO, Voxel::default());
        });
        commit(&mut store, &outputs);
    }
}
