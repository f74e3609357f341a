//! Bounds-checked voxel volume: dense storage plus its visibility index

use std::time::Instant;

use glam::{IVec3, Vec3};

use crate::core::error::Error;
use crate::core::types::Result;

use super::dense::DenseStore;
use super::geometry::GridGeometry;
use super::visibility::VisibilityIndex;
use super::voxel::{Voxel, VoxelState};

/// Owns the dense voxel array and the derived visibility index.
///
/// Every mutation path goes through here or through the edit engines, which
/// borrow both halves via [`VolumeData::parts_mut`].
#[derive(Debug)]
pub struct VolumeData {
    dense: DenseStore,
    visibility: VisibilityIndex,
}

impl VolumeData {
    /// Allocate an all-`Unknown` volume
    pub fn new(x: i32, y: i32, z: i32, scale: f32, chunk_dim: i32) -> Result<Self> {
        let geometry = GridGeometry::new(IVec3::new(x, y, z), scale, chunk_dim)?;
        Ok(Self::from_geometry(geometry))
    }

    pub fn from_geometry(geometry: GridGeometry) -> Self {
        log::debug!(
            "Allocating volume {}x{}x{} ({} chunks of {}^3)",
            geometry.dims().x,
            geometry.dims().y,
            geometry.dims().z,
            geometry.chunk_count(),
            geometry.chunk_dim()
        );
        Self {
            dense: DenseStore::new(geometry),
            visibility: VisibilityIndex::new(geometry),
        }
    }

    pub(crate) fn from_dense(dense: DenseStore) -> Self {
        let visibility = VisibilityIndex::new(*dense.geometry());
        Self { dense, visibility }
    }

    #[inline]
    pub fn geometry(&self) -> &GridGeometry {
        self.dense.geometry()
    }

    #[inline]
    pub fn dense(&self) -> &DenseStore {
        &self.dense
    }

    #[inline]
    pub fn visibility(&self) -> &VisibilityIndex {
        &self.visibility
    }

    /// Both halves, mutably, for the edit engines
    #[inline]
    pub(crate) fn parts_mut(&mut self) -> (&mut DenseStore, &mut VisibilityIndex) {
        (&mut self.dense, &mut self.visibility)
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        self.geometry().contains(x, y, z)
    }

    fn check_bounds(&self, x: i32, y: i32, z: i32) -> Result<()> {
        if self.contains(x, y, z) {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                x,
                y,
                z,
                dims: self.geometry().dims().to_array(),
            })
        }
    }

    /// Voxel at `(x, y, z)`, or [`Error::OutOfBounds`]
    pub fn get_voxel(&self, x: i32, y: i32, z: i32) -> Result<Voxel> {
        self.check_bounds(x, y, z)?;
        Ok(self.dense.get(x, y, z))
    }

    /// Voxel at `(x, y, z)` if it is inside the grid
    pub fn try_get_voxel(&self, x: i32, y: i32, z: i32) -> Option<Voxel> {
        self.contains(x, y, z).then(|| self.dense.get(x, y, z))
    }

    /// Recolor a voxel, or [`Error::OutOfBounds`]
    pub fn set_voxel_color(&mut self, x: i32, y: i32, z: i32, color: u8) -> Result<()> {
        self.check_bounds(x, y, z)?;
        self.recolor(x, y, z, color);
        Ok(())
    }

    /// Recolor a voxel; returns false and changes nothing if out of range
    pub fn try_set_voxel_color(&mut self, x: i32, y: i32, z: i32, color: u8) -> bool {
        if !self.contains(x, y, z) {
            return false;
        }
        self.recolor(x, y, z, color);
        true
    }

    fn recolor(&mut self, x: i32, y: i32, z: i32, color: u8) {
        let voxel = self.dense.get_mut(x, y, z);
        voxel.color = color;
        if voxel.state == VoxelState::Visible {
            // Snapshot in the index now carries the old color
            let chunk = self.geometry().chunk_of(x, y, z);
            self.visibility.mark_removal_touched(chunk);
        }
    }

    /// Scrub stale visibility entries; run before reading the index
    pub fn clean_dirty_data(&mut self) -> usize {
        self.visibility.reconcile(&self.dense)
    }

    /// End the current edit cycle
    pub fn reset_modified_chunks(&mut self) {
        self.visibility.reset_cycle();
    }

    /// Fill every voxel as `Solid` with `color(position)`, then expose the
    /// six outer faces as `Visible`.
    pub fn init_with<F>(&mut self, color: F)
    where
        F: Fn(IVec3) -> u8 + Sync + Send,
    {
        let start = Instant::now();
        let geometry = *self.geometry();

        self.dense.par_fill(|p| {
            let state = if geometry.on_boundary(p) {
                VoxelState::Visible
            } else {
                VoxelState::Solid
            };
            Voxel::new(p.x, p.y, p.z, color(p), state)
        });

        self.visibility.clear();
        let mut exposed = 0usize;
        for_each_boundary_cell(geometry.dims(), |p| {
            self.visibility.mark_visible(self.dense.get(p.x, p.y, p.z));
            exposed += 1;
        });

        log::info!(
            "Initialized {} voxels ({} exposed) in {:.1}ms",
            geometry.voxel_count(),
            exposed,
            start.elapsed().as_secs_f64() * 1000.0
        );
    }

    /// Fill with a single color
    pub fn init_solid(&mut self, color: u8) {
        self.init_with(|_| color);
    }

    /// Fill with deterministic pseudo-random colors
    pub fn init_random(&mut self, seed: u32) {
        self.init_with(|p| (hash_3d(p.x, p.y, p.z, seed) >> 24) as u8);
    }

    /// Voxel containing a volume-local position, if inside the grid
    pub fn voxel_index_from_local(&self, local: Vec3) -> Option<IVec3> {
        self.geometry().voxel_index_from_local(local)
    }

    /// Round a volume-local position to the nearest voxel origin
    pub fn snap_local_to_voxel_origin(&self, local: Vec3) -> Vec3 {
        self.geometry().snap_local_to_voxel_origin(local)
    }

    /// Change world units per voxel edge (<= 0 becomes 1.0)
    pub fn set_scale(&mut self, scale: f32) -> f32 {
        let geometry = self.geometry().with_scale(scale);
        self.dense.set_geometry(geometry);
        self.visibility.set_geometry(geometry);
        geometry.scale()
    }

    /// Recount visible voxels from scratch, ignoring the index
    pub fn count_visible(&self) -> usize {
        self.dense
            .as_slice()
            .iter()
            .filter(|v| v.state == VoxelState::Visible)
            .count()
    }
}

/// Visit every cell on the outer shell of a grid exactly once
fn for_each_boundary_cell(dims: IVec3, mut f: impl FnMut(IVec3)) {
    for z in 0..dims.z {
        for y in 0..dims.y {
            let full_row = z == 0 || z == dims.z - 1 || y == 0 || y == dims.y - 1;
            if full_row {
                for x in 0..dims.x {
                    f(IVec3::new(x, y, z));
                }
            } else {
                f(IVec3::new(0, y, z));
                if dims.x > 1 {
                    f(IVec3::new(dims.x - 1, y, z));
                }
            }
        }
    }
}

/// Simple deterministic hash for color noise
fn hash_3d(x: i32, y: i32, z: i32, seed: u32) -> u32 {
    let mut h = seed;
    for v in [x, y, z] {
        h ^= v as u32;
        h = h.wrapping_mul(0x45d9f3b);
        h ^= h >> 16;
    }
    h
}
