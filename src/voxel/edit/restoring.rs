//! Voxel restoration: the inverse of cutting.

use std::time::Instant;

use glam::IVec3;

use crate::math::FACE_NEIGHBORS;
use crate::voxel::dense::DenseStore;
use crate::voxel::parallel;
use crate::voxel::visibility::VisibilityIndex;
use crate::voxel::volume_data::VolumeData;
use crate::voxel::voxel::VoxelState;

use super::shell::{self, Shell};
use super::undo::{UndoLog, VoxelCmd};

/// Puts removed voxels back and records each restoration for undo
pub struct RestoringEngine<'a> {
    data: &'a mut VolumeData,
    undo: &'a mut UndoLog,
}

impl<'a> RestoringEngine<'a> {
    pub fn new(data: &'a mut VolumeData, undo: &'a mut UndoLog) -> Self {
        Self { data, undo }
    }

    /// Restore one voxel, re-deriving its visibility and hiding neighbors
    /// that are no longer exposed. Out-of-range targets are ignored.
    pub fn add_voxel(&mut self, x: i32, y: i32, z: i32) {
        if add_point(self.data, x, y, z) {
            self.undo.write(VoxelCmd::restoring(x, y, z));
        }
    }

    /// Restore every voxel strictly closer than `radius` to `center`.
    /// Radius 0 is a no-op and radius 1 restores just the center.
    pub fn add_sphere(&mut self, center: IVec3, radius: i32) {
        let dims = self.data.geometry().dims();
        shell::for_each_sphere_cell(center, radius, IVec3::ZERO, dims, |p| {
            self.add_voxel(p.x, p.y, p.z);
        });
    }

    /// Restore the cube of shells `0..radius` around `center` and force the
    /// shell at `radius` visible.
    ///
    /// Inner shells go straight to `Solid` without a neighbor check. The hull
    /// is promoted even where it does not border a removed voxel.
    /// Radius below 1 is a no-op.
    pub fn add_cube_parallel(&mut self, center: IVec3, radius: i32) {
        if radius < 1 {
            return;
        }
        let start = Instant::now();
        let (dense, visibility) = self.data.parts_mut();
        let geometry = *dense.geometry();
        let dims = geometry.dims();

        let shells = shell::cube_shells(center, radius - 1, IVec3::ZERO, dims);
        let inner = parallel::fork_join(dense, &shells, |shell, store, out| {
            shell.for_each_cell(IVec3::ZERO, dims, |p| {
                let voxel = store.get(p.x, p.y, p.z);
                match voxel.state {
                    VoxelState::Removed => {
                        out.write(store, p, voxel.with_state(VoxelState::Solid));
                    }
                    VoxelState::Visible => {
                        out.write(store, p, voxel.with_state(VoxelState::Solid));
                        out.removal_touched.insert(geometry.chunk_of(p.x, p.y, p.z));
                    }
                    _ => {}
                }
            });
        });

        let hull: Vec<Shell> = Some(Shell::new(center, radius))
            .filter(|hull| hull.reaches(IVec3::ZERO, dims))
            .into_iter()
            .collect();
        let outer = parallel::fork_join(dense, &hull, |shell, store, out| {
            shell.for_each_cell(IVec3::ZERO, dims, |p| {
                let voxel = store.get(p.x, p.y, p.z);
                if voxel.state != VoxelState::Visible {
                    out.write(store, p, voxel.with_state(VoxelState::Visible));
                }
            });
        });

        // Log only cells that were actually removed, read before committing
        let mut count = 0;
        for &(idx, voxel) in inner.iter().chain(&outer).flat_map(|out| out.writes.iter()) {
            if dense.get_index(idx).state == VoxelState::Removed {
                self.undo.write(VoxelCmd::restoring(voxel.x, voxel.y, voxel.z));
                count += 1;
            }
        }

        parallel::commit(dense, &inner);
        parallel::commit(dense, &outer);

        for out in &outer {
            for &(_, voxel) in &out.writes {
                visibility.mark_visible(voxel);
            }
        }
        for out in &inner {
            visibility.merge_touched(out.removal_touched.iter().copied(), true);
        }

        log::debug!(
            "Cube restore at {} r={} restored {} voxels in {:.2}ms",
            center,
            radius,
            count,
            start.elapsed().as_secs_f64() * 1000.0
        );
    }
}

/// Unlogged point restoration shared with undo replay.
///
/// Returns false if the target is outside the grid.
pub(crate) fn add_point(data: &mut VolumeData, x: i32, y: i32, z: i32) -> bool {
    if !data.contains(x, y, z) {
        return false;
    }
    let (dense, visibility) = data.parts_mut();
    let target = IVec3::new(x, y, z);
    let chunk = dense.geometry().chunk_of(x, y, z);

    let mut voxel = dense.get(x, y, z);
    voxel.x = x;
    voxel.y = y;
    voxel.z = z;
    let was_visible = voxel.state == VoxelState::Visible;

    // Present before the neighbor pass so neighbors see it as filled
    if !was_visible {
        voxel.state = VoxelState::Solid;
        dense.set(x, y, z, voxel);
    }

    let mut exposed = false;
    for offset in FACE_NEIGHBORS {
        exposed |= is_removed_and_reconcile(dense, visibility, target + offset);
    }

    if exposed {
        voxel.state = VoxelState::Visible;
        dense.set(x, y, z, voxel);
        if was_visible {
            visibility.mark_touched(chunk);
        } else {
            visibility.mark_visible(voxel);
        }
    } else if was_visible {
        voxel.state = VoxelState::Solid;
        dense.set(x, y, z, voxel);
        visibility.mark_removal_touched(chunk);
    }
    true
}

/// True if `p` is outside the grid or `Removed`.
///
/// A visible neighbor that no longer borders anything empty is demoted to
/// `Solid` on the way.
fn is_removed_and_reconcile(dense: &mut DenseStore, visibility: &mut VisibilityIndex, p: IVec3) -> bool {
    let Some(state) = dense.state_at(p) else {
        return true;
    };

    if state == VoxelState::Visible && !dense.borders_empty(p) {
        dense.get_mut(p.x, p.y, p.z).state = VoxelState::Solid;
        visibility.mark_removal_touched(dense.geometry().chunk_of(p.x, p.y, p.z));
        return false;
    }
    state == VoxelState::Removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::edit::CuttingEngine;

    fn solid_volume(n: i32) -> VolumeData {
        let mut data = VolumeData::new(n, n, n, 0.125, 16).unwrap();
        data.init_solid(1);
        data
    }

    fn state(data: &VolumeData, x: i32, y: i32, z: i32) -> VoxelState {
        data.get_voxel(x, y, z).unwrap().state
    }

    #[test]
    fn test_add_next_to_hole_stays_visible() {
        let mut data = solid_volume(7);
        let mut undo = UndoLog::default();
        CuttingEngine::new(&mut data, &mut undo).remove_voxel(3, 3, 3);
        CuttingEngine::new(&mut data, &mut undo).remove_voxel(3, 3, 4);

        RestoringEngine::new(&mut data, &mut undo).add_voxel(3, 3, 3);
        assert_eq!(state(&data, 3, 3, 3), VoxelState::Visible);
        assert_eq!(state(&data, 3, 3, 4), VoxelState::Removed);
        // Still borders (3,3,4)
        assert_eq!(state(&data, 2, 3, 4), VoxelState::Visible);
        // Only bordered (3,3,3)
        assert_eq!(state(&data, 3, 3, 2), VoxelState::Solid);
        assert_eq!(undo.size(), 3);
    }

    #[test]
    fn test_add_unknown_writes_coordinates() {
        let mut data = VolumeData::new(3, 3, 3, 1.0, 16).unwrap();
        let mut undo = UndoLog::default();
        RestoringEngine::new(&mut data, &mut undo).add_voxel(1, 2, 0);

        let v = data.get_voxel(1, 2, 0).unwrap();
        assert_eq!(v.position(), IVec3::new(1, 2, 0));
        // Touches the outside
        assert_eq!(v.state, VoxelState::Visible);
    }

    #[test]
    fn test_add_out_of_range_is_ignored() {
        let mut data = solid_volume(3);
        let mut undo = UndoLog::default();
        RestoringEngine::new(&mut data, &mut undo).add_voxel(0, 3, 0);
        assert_eq!(undo.size(), 0);
    }

    #[test]
    fn test_add_sphere_refills_hole() {
        let mut data = solid_volume(9);
        let mut undo = UndoLog::default();
        let center = IVec3::splat(4);
        CuttingEngine::new(&mut data, &mut undo).remove_sphere(center, 2);
        RestoringEngine::new(&mut data, &mut undo).add_sphere(center, 2);

        for z in 1..8 {
            for y in 1..8 {
                for x in 1..8 {
                    assert_eq!(state(&data, x, y, z), VoxelState::Solid, "at {},{},{}", x, y, z);
                }
            }
        }
    }

    #[test]
    fn test_add_cube_parallel() {
        let mut data = solid_volume(9);
        let mut undo = UndoLog::default();
        let center = IVec3::splat(4);
        CuttingEngine::new(&mut data, &mut undo).remove_cube_parallel(center, 2);
        undo.clear();

        RestoringEngine::new(&mut data, &mut undo).add_cube_parallel(center, 2);

        assert_eq!(state(&data, 4, 4, 4), VoxelState::Solid);
        assert_eq!(state(&data, 3, 5, 4), VoxelState::Solid);
        // Hull is forced visible
        assert_eq!(state(&data, 6, 6, 6), VoxelState::Visible);
        assert_eq!(state(&data, 2, 4, 4), VoxelState::Visible);
        assert_eq!(undo.size(), 125);
    }

    #[test]
    fn test_add_sphere_huge_radius() {
        let mut data = solid_volume(5);
        let mut undo = UndoLog::default();
        CuttingEngine::new(&mut data, &mut undo).remove_sphere(IVec3::splat(2), i32::MAX);
        undo.clear();

        RestoringEngine::new(&mut data, &mut undo).add_sphere(IVec3::splat(2), i32::MAX);
        assert_eq!(state(&data, 2, 2, 2), VoxelState::Solid);
        assert_eq!(state(&data, 0, 2, 2), VoxelState::Visible);
        assert_eq!(state(&data, 4, 4, 4), VoxelState::Visible);
        assert_eq!(undo.size(), 5 * 5 * 5);

        undo.clear();
        RestoringEngine::new(&mut data, &mut undo).add_sphere(IVec3::splat(i32::MAX), 46_341);
        assert_eq!(undo.size(), 0);
    }

    #[test]
    fn test_add_cube_huge_radius() {
        let mut data = solid_volume(5);
        let mut undo = UndoLog::default();
        CuttingEngine::new(&mut data, &mut undo).remove_cube_parallel(IVec3::splat(2), 1);
        undo.clear();

        // The hull lies beyond the grid, so every shell that reaches it is inner
        RestoringEngine::new(&mut data, &mut undo).add_cube_parallel(IVec3::splat(2), i32::MAX);
        assert_eq!(state(&data, 2, 2, 2), VoxelState::Solid);
        assert_eq!(state(&data, 1, 1, 1), VoxelState::Solid);
        assert_eq!(undo.size(), 27);

        undo.clear();
        RestoringEngine::new(&mut data, &mut undo).add_cube_parallel(IVec3::new(i32::MIN, 2, 2), i32::MAX);
        assert_eq!(undo.size(), 0);
    }

    #[test]
    fn test_add_cube_zero_radius_is_noop() {
        let mut data = solid_volume(5);
        let mut undo = UndoLog::default();
        CuttingEngine::new(&mut data, &mut undo).remove_voxel(2, 2, 2);
        RestoringEngine::new(&mut data, &mut undo).add_cube_parallel(IVec3::splat(2), 0);
        assert_eq!(state(&data, 2, 2, 2), VoxelState::Removed);
    }
}
