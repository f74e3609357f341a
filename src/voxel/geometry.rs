//! Immutable grid geometry: dimensions, scale and chunk layout

use glam::{IVec3, Vec3};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::math::grid_index;

/// Dimensions, scale and chunk layout of one volume
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    dims: IVec3,
    scale: f32,
    chunk_dim: i32,
    chunk_counts: IVec3,
}

impl GridGeometry {
    /// Validate and derive chunk counts (`floor(dim / chunk_dim) + 1` per axis).
    ///
    /// A non-positive scale is replaced by 1.0.
    pub fn new(dims: IVec3, scale: f32, chunk_dim: i32) -> Result<Self> {
        if dims.min_element() <= 0 {
            return Err(Error::InvalidGeometry(format!(
                "grid dimensions must be positive, got {}x{}x{}",
                dims.x, dims.y, dims.z
            )));
        }
        if chunk_dim <= 0 {
            return Err(Error::InvalidGeometry(format!(
                "chunk dimension must be positive, got {chunk_dim}"
            )));
        }
        let voxels = dims.x as i64 * dims.y as i64 * dims.z as i64;
        if voxels > i32::MAX as i64 {
            return Err(Error::InvalidGeometry(format!(
                "{voxels} voxels exceed the addressable range"
            )));
        }

        Ok(Self {
            dims,
            scale: sanitize_scale(scale),
            chunk_dim,
            chunk_counts: dims / chunk_dim + IVec3::ONE,
        })
    }

    /// Grid dimensions in voxels
    #[inline]
    pub fn dims(&self) -> IVec3 {
        self.dims
    }

    /// World units per voxel edge
    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Voxels per chunk edge
    #[inline]
    pub fn chunk_dim(&self) -> i32 {
        self.chunk_dim
    }

    /// Chunks per axis
    #[inline]
    pub fn chunk_counts(&self) -> IVec3 {
        self.chunk_counts
    }

    /// Total number of voxel cells
    #[inline]
    pub fn voxel_count(&self) -> usize {
        (self.dims.x * self.dims.y * self.dims.z) as usize
    }

    /// Total number of chunk ids
    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunk_counts.x as usize * self.chunk_counts.y as usize * self.chunk_counts.z as usize
    }

    /// Voxel capacity of one full chunk
    #[inline]
    pub fn chunk_voxel_count(&self) -> usize {
        (self.chunk_dim * self.chunk_dim * self.chunk_dim) as usize
    }

    /// Cells in one z-slab
    #[inline]
    pub fn slab_len(&self) -> usize {
        (self.dims.x * self.dims.y) as usize
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0 && y >= 0 && z >= 0 && x < self.dims.x && y < self.dims.y && z < self.dims.z
    }

    /// Linear index of an in-range voxel
    #[inline]
    pub fn index(&self, x: i32, y: i32, z: i32) -> usize {
        debug_assert!(self.contains(x, y, z));
        grid_index::to_1d(x, y, z, self.dims.x, self.dims.y) as usize
    }

    /// Grid position of a linear index
    #[inline]
    pub fn position(&self, idx: usize) -> IVec3 {
        grid_index::to_3d(idx as i32, self.dims.x, self.dims.y)
    }

    /// Chunk id of a voxel, [`grid_index::OUTSIDE`] for negative coordinates
    #[inline]
    pub fn chunk_of(&self, x: i32, y: i32, z: i32) -> i32 {
        grid_index::chunk_of(
            x,
            y,
            z,
            self.chunk_dim,
            self.chunk_counts.x,
            self.chunk_counts.y,
        )
    }

    /// Half-open voxel range `[min, max)` covered by a chunk, clipped to the grid.
    ///
    /// Trailing chunks may be empty (`min == max` on some axis).
    pub fn chunk_bounds(&self, chunk_id: i32) -> (IVec3, IVec3) {
        let coord = grid_index::to_3d(chunk_id, self.chunk_counts.x, self.chunk_counts.y);
        let min = (coord * self.chunk_dim).min(self.dims);
        let max = (min + IVec3::splat(self.chunk_dim)).min(self.dims);
        (min, max)
    }

    /// Visit every voxel position of a chunk in linear order
    pub fn for_each_in_chunk(&self, chunk_id: i32, mut f: impl FnMut(IVec3)) {
        let (min, max) = self.chunk_bounds(chunk_id);
        for z in min.z..max.z {
            for y in min.y..max.y {
                for x in min.x..max.x {
                    f(IVec3::new(x, y, z));
                }
            }
        }
    }

    /// True if the cell touches the outside of the grid on any face
    #[inline]
    pub fn on_boundary(&self, p: IVec3) -> bool {
        p.x == 0
            || p.y == 0
            || p.z == 0
            || p.x == self.dims.x - 1
            || p.y == self.dims.y - 1
            || p.z == self.dims.z - 1
    }

    /// Voxel containing a volume-local position (`floor(pos / scale)`), if in range
    pub fn voxel_index_from_local(&self, local: Vec3) -> Option<IVec3> {
        let p = (local / self.scale).floor().as_ivec3();
        self.contains(p.x, p.y, p.z).then_some(p)
    }

    /// Round a volume-local position to the nearest voxel origin
    pub fn snap_local_to_voxel_origin(&self, local: Vec3) -> Vec3 {
        (local / self.scale).round() * self.scale
    }

    /// Same layout, different scale
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = sanitize_scale(scale);
        self
    }
}

fn sanitize_scale(scale: f32) -> f32 {
    if scale > 0.0 {
        scale
    } else {
        log::warn!("Volume scale {scale} is not positive, using 1.0");
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_volume_layout() {
        let g = GridGeometry::new(IVec3::splat(7), 0.125, 16).unwrap();
        assert_eq!(g.chunk_counts(), IVec3::ONE);
        assert_eq!(g.chunk_count(), 1);
        assert_eq!(g.chunk_voxel_count(), 4096);
        assert_eq!(g.voxel_count(), 343);
    }

    #[test]
    fn test_exact_multiple_adds_trailing_chunk() {
        let g = GridGeometry::new(IVec3::new(32, 16, 8), 1.0, 16).unwrap();
        assert_eq!(g.chunk_counts(), IVec3::new(3, 2, 1));
        let (min, max) = g.chunk_bounds(2);
        assert_eq!(min.x, 32);
        assert_eq!(max.x, 32);
    }

    #[test]
    fn test_rejects_bad_dims() {
        assert!(GridGeometry::new(IVec3::new(0, 4, 4), 1.0, 16).is_err());
        assert!(GridGeometry::new(IVec3::splat(4), 1.0, 0).is_err());
    }

    #[test]
    fn test_scale_clamped() {
        let g = GridGeometry::new(IVec3::splat(4), -2.0, 16).unwrap();
        assert_eq!(g.scale(), 1.0);
        assert_eq!(g.with_scale(0.5).scale(), 0.5);
    }

    #[test]
    fn test_chunk_bounds_clipped() {
        let g = GridGeometry::new(IVec3::new(20, 20, 20), 1.0, 16).unwrap();
        let id = g.chunk_of(17, 0, 0);
        let (min, max) = g.chunk_bounds(id);
        assert_eq!(min, IVec3::new(16, 0, 0));
        assert_eq!(max, IVec3::new(20, 16, 16));

        let mut count = 0;
        g.for_each_in_chunk(id, |p| {
            assert_eq!(g.chunk_of(p.x, p.y, p.z), id);
            count += 1;
        });
        assert_eq!(count, 4 * 16 * 16);
    }

    #[test]
    fn test_local_lookup() {
        let g = GridGeometry::new(IVec3::splat(8), 0.25, 16).unwrap();
        assert_eq!(g.voxel_index_from_local(Vec3::new(0.3, 0.0, 1.99)), Some(IVec3::new(1, 0, 7)));
        assert_eq!(g.voxel_index_from_local(Vec3::new(-0.1, 0.0, 0.0)), None);
        assert_eq!(g.voxel_index_from_local(Vec3::new(2.0, 0.0, 0.0)), None);
        assert_eq!(g.snap_local_to_voxel_origin(Vec3::new(0.3, 0.4, 0.0)), Vec3::new(0.25, 0.5, 0.0));
    }
}
