//! Voxel removal: points, spheres and parallel cubes.

use std::time::Instant;

use glam::IVec3;

use crate::math::FACE_NEIGHBORS;
use crate::voxel::parallel;
use crate::voxel::volume_data::VolumeData;
use crate::voxel::voxel::VoxelState;

use super::shell::{self, Shell};
use super::undo::{UndoLog, VoxelCmd};

/// Removes voxels from a volume and records each removal for undo
pub struct CuttingEngine<'a> {
    data: &'a mut VolumeData,
    undo: &'a mut UndoLog,
}

impl<'a> CuttingEngine<'a> {
    pub fn new(data: &'a mut VolumeData, undo: &'a mut UndoLog) -> Self {
        Self { data, undo }
    }

    /// Remove one voxel and expose its solid neighbors.
    ///
    /// Every call is logged. An out-of-range target only exposes its
    /// in-range neighbors.
    pub fn remove_voxel(&mut self, x: i32, y: i32, z: i32) {
        remove_point(self.data, x, y, z);
        self.undo.write(VoxelCmd::cutting(x, y, z));
    }

    /// Remove every voxel strictly closer than `radius` to `center`.
    /// Radius 0 is a no-op and radius 1 removes just the center.
    ///
    /// Cells more than one step outside the grid cannot reach it and are
    /// skipped without being logged.
    pub fn remove_sphere(&mut self, center: IVec3, radius: i32) {
        let dims = self.data.geometry().dims();
        shell::for_each_sphere_cell(center, radius, IVec3::NEG_ONE, dims + IVec3::ONE, |p| {
            self.remove_voxel(p.x, p.y, p.z);
        });
    }

    /// Remove the `(2 * radius + 1)³` cube around `center`.
    ///
    /// One task per concentric shell demotes present voxels to `Removed`;
    /// then a single hull task exposes solid voxels bordering the hole.
    /// Radius below 1 is a no-op.
    pub fn remove_cube_parallel(&mut self, center: IVec3, radius: i32) {
        if radius < 1 {
            return;
        }
        let start = Instant::now();
        let (dense, visibility) = self.data.parts_mut();
        let geometry = *dense.geometry();
        let dims = geometry.dims();

        let shells = shell::cube_shells(center, radius, IVec3::ZERO, dims);
        let removed = parallel::fork_join(dense, &shells, |shell, store, out| {
            shell.for_each_cell(IVec3::ZERO, dims, |p| {
                let voxel = store.get(p.x, p.y, p.z);
                match voxel.state {
                    VoxelState::Solid => {
                        out.write(store, p, voxel.with_state(VoxelState::Removed));
                    }
                    VoxelState::Visible => {
                        out.write(store, p, voxel.with_state(VoxelState::Removed));
                        out.removal_touched.insert(geometry.chunk_of(p.x, p.y, p.z));
                    }
                    _ => {}
                }
            });
        });
        parallel::commit(dense, &removed);

        let hull: Vec<Shell> = radius
            .checked_add(1)
            .map(|r| Shell::new(center, r))
            .filter(|hull| hull.reaches(IVec3::ZERO, dims))
            .into_iter()
            .collect();
        let exposed = parallel::fork_join(dense, &hull, |shell, store, out| {
            shell.for_each_cell(IVec3::ZERO, dims, |p| {
                let voxel = store.get(p.x, p.y, p.z);
                if voxel.state == VoxelState::Solid && store.borders_empty(p) {
                    out.write(store, p, voxel.with_state(VoxelState::Visible));
                }
            });
        });
        parallel::commit(dense, &exposed);

        for voxel in exposed.iter().flat_map(|out| out.writes.iter().map(|&(_, v)| v)) {
            visibility.mark_visible(voxel);
        }

        let mut count = 0;
        for out in &removed {
            visibility.merge_touched(out.removal_touched.iter().copied(), true);
            for &(_, voxel) in &out.writes {
                self.undo.write(VoxelCmd::cutting(voxel.x, voxel.y, voxel.z));
                count += 1;
            }
        }

        log::debug!(
            "Cube cut at {} r={} removed {} voxels in {:.2}ms",
            center,
            radius,
            count,
            start.elapsed().as_secs_f64() * 1000.0
        );
    }
}

/// Unlogged point removal shared with undo replay
pub(crate) fn remove_point(data: &mut VolumeData, x: i32, y: i32, z: i32) {
    let (dense, visibility) = data.parts_mut();
    let geometry = *dense.geometry();

    if geometry.contains(x, y, z) {
        let voxel = dense.get_mut(x, y, z);
        match voxel.state {
            VoxelState::Solid => voxel.state = VoxelState::Removed,
            VoxelState::Visible => {
                voxel.state = VoxelState::Removed;
                visibility.mark_removal_touched(geometry.chunk_of(x, y, z));
            }
            _ => {}
        }
    }

    let target = IVec3::new(x, y, z);
    for offset in FACE_NEIGHBORS {
        let p = target + offset;
        if !geometry.contains(p.x, p.y, p.z) {
            continue;
        }
        let neighbor = dense.get_mut(p.x, p.y, p.z);
        if neighbor.state == VoxelState::Solid {
            neighbor.state = VoxelState::Visible;
            visibility.mark_visible(*neighbor);
        }
    }
}
