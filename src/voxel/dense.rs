//! Dense voxel storage: the ground truth for state and color

use glam::IVec3;
use rayon::prelude::*;

use super::geometry::GridGeometry;
use super::voxel::{Voxel, VoxelState};

/// Flat array of every voxel in the grid, z-major.
///
/// `get`/`set` do no bounds validation; out-of-range coordinates are a
/// caller bug. Use [`DenseStore::state_at`] when the position may be outside.
#[derive(Clone, Debug)]
pub struct DenseStore {
    geometry: GridGeometry,
    voxels: Vec<Voxel>,
}

impl DenseStore {
    /// Allocate a store with every voxel `Unknown`
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            voxels: vec![Voxel::default(); geometry.voxel_count()],
            geometry,
        }
    }

    /// Wrap an existing voxel array laid out for `geometry`
    pub(crate) fn from_voxels(geometry: GridGeometry, voxels: Vec<Voxel>) -> Self {
        debug_assert_eq!(voxels.len(), geometry.voxel_count());
        Self { geometry, voxels }
    }

    #[inline]
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub(crate) fn set_geometry(&mut self, geometry: GridGeometry) {
        self.geometry = geometry;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> Voxel {
        self.voxels[self.geometry.index(x, y, z)]
    }

    #[inline]
    pub fn get_mut(&mut self, x: i32, y: i32, z: i32) -> &mut Voxel {
        let idx = self.geometry.index(x, y, z);
        &mut self.voxels[idx]
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, z: i32, voxel: Voxel) {
        let idx = self.geometry.index(x, y, z);
        self.voxels[idx] = voxel;
    }

    #[inline]
    pub fn get_index(&self, idx: usize) -> Voxel {
        self.voxels[idx]
    }

    #[inline]
    pub fn set_index(&mut self, idx: usize, voxel: Voxel) {
        self.voxels[idx] = voxel;
    }

    /// State at `p`, or `None` if `p` is outside the grid
    #[inline]
    pub fn state_at(&self, p: IVec3) -> Option<VoxelState> {
        self.geometry
            .contains(p.x, p.y, p.z)
            .then(|| self.voxels[self.geometry.index(p.x, p.y, p.z)].state)
    }

    /// True if any face neighbor of `p` is outside the grid or `Removed`
    pub fn borders_empty(&self, p: IVec3) -> bool {
        crate::math::FACE_NEIGHBORS.iter().any(|&offset| {
            matches!(self.state_at(p + offset), None | Some(VoxelState::Removed))
        })
    }

    pub fn as_slice(&self) -> &[Voxel] {
        &self.voxels
    }

    /// Fill every cell in parallel, one rayon task per z-slab.
    ///
    /// `f` receives the cell position and returns the voxel to store.
    pub fn par_fill<F>(&mut self, f: F)
    where
        F: Fn(IVec3) -> Voxel + Sync + Send,
    {
        let dims = self.geometry.dims();
        let slab_len = self.geometry.slab_len();

        self.voxels
            .par_chunks_mut(slab_len)
            .enumerate()
            .for_each(|(z, slab)| {
                for y in 0..dims.y {
                    for x in 0..dims.x {
                        let idx = (x + y * dims.x) as usize;
                        slab[idx] = f(IVec3::new(x, y, z as i32));
                    }
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(x: i32, y: i32, z: i32) -> DenseStore {
        DenseStore::new(GridGeometry::new(IVec3::new(x, y, z), 1.0, 16).unwrap())
    }

    #[test]
    fn test_new_is_unknown() {
        let store = store(3, 4, 5);
        assert_eq!(store.len(), 60);
        assert!(store.as_slice().iter().all(|v| v.state == VoxelState::Unknown));
    }

    #[test]
    fn test_get_set() {
        let mut store = store(4, 4, 4);
        let v = Voxel::new(1, 2, 3, 42, VoxelState::Solid);
        store.set(1, 2, 3, v);
        assert_eq!(store.get(1, 2, 3), v);
        assert_eq!(store.get_index(3 * 16 + 2 * 4 + 1), v);
    }

    #[test]
    fn test_par_fill_matches_positions() {
        let mut store = store(5, 3, 4);
        store.par_fill(|p| Voxel::new(p.x, p.y, p.z, (p.x + p.y * 5) as u8, VoxelState::Solid));
        for (idx, v) in store.as_slice().iter().enumerate() {
            assert_eq!(store.geometry().position(idx), v.position());
            assert_eq!(v.state, VoxelState::Solid);
        }
    }

    #[test]
    fn test_borders_empty() {
        let mut store = store(3, 3, 3);
        store.par_fill(|p| Voxel::new(p.x, p.y, p.z, 0, VoxelState::Solid));
        assert!(store.borders_empty(IVec3::ZERO));
        assert!(!store.borders_empty(IVec3::ONE));

        store.get_mut(1, 1, 0).state = VoxelState::Removed;
        assert!(store.borders_empty(IVec3::ONE));
        assert_eq!(store.state_at(IVec3::new(3, 0, 0)), None);
    }
}
