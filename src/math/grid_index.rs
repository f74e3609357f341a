//! Linear indexing for dense voxel grids
//!
//! Layout is z-major, then y, then x. Any negative coordinate maps to
//! [`OUTSIDE`]. Upper bounds are not checked here; callers test them first.

use glam::IVec3;

/// Sentinel for coordinates outside the grid
pub const OUTSIDE: i32 = -1;

/// Linearize `(x, y, z)` for a grid of `x_max` by `y_max` cells per slab
#[inline]
pub fn to_1d(x: i32, y: i32, z: i32, x_max: i32, y_max: i32) -> i32 {
    if x < 0 || y < 0 || z < 0 {
        return OUTSIDE;
    }
    z * x_max * y_max + y * x_max + x
}

/// Inverse of [`to_1d`]; negative indices give `(-1, -1, -1)`
#[inline]
pub fn to_3d(idx: i32, x_max: i32, y_max: i32) -> IVec3 {
    if idx < 0 {
        return IVec3::splat(OUTSIDE);
    }
    let slab = x_max * y_max;
    let z = idx / slab;
    let rem = idx - z * slab;
    IVec3::new(rem % x_max, rem / x_max, z)
}

/// Chunk id containing voxel `(x, y, z)`
#[inline]
pub fn chunk_of(x: i32, y: i32, z: i32, chunk_dim: i32, chunk_x_max: i32, chunk_y_max: i32) -> i32 {
    if x < 0 || y < 0 || z < 0 {
        return OUTSIDE;
    }
    to_1d(
        x.div_euclid(chunk_dim),
        y.div_euclid(chunk_dim),
        z.div_euclid(chunk_dim),
        chunk_x_max,
        chunk_y_max,
    )
}

/// The six face-adjacent offsets
pub const FACE_NEIGHBORS: [IVec3; 6] = [
    IVec3::new(1, 0, 0),
    IVec3::new(-1, 0, 0),
    IVec3::new(0, 1, 0),
    IVec3::new(0, -1, 0),
    IVec3::new(0, 0, 1),
    IVec3::new(0, 0, -1),
];
