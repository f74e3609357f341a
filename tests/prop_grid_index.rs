use glam::IVec3;
use proptest::prelude::*;
use voxvol::math::{chunk_of, to_1d, to_3d, OUTSIDE};
use voxvol::voxel::GridGeometry;

fn dim() -> impl Strategy<Value = i32> {
    1i32..=40
}

proptest! {
    // to_3d inverts to_1d for every in-range coordinate
    #[test]
    fn coordinate_bijection(xm in dim(), ym in dim(), zm in dim(), seed in any::<u64>()) {
        let x = (seed % xm as u64) as i32;
        let y = ((seed >> 16) % ym as u64) as i32;
        let z = ((seed >> 32) % zm as u64) as i32;
        let idx = to_1d(x, y, z, xm, ym);
        prop_assert!(idx >= 0);
        prop_assert!(idx < xm * ym * zm);
        prop_assert_eq!(to_3d(idx, xm, ym), IVec3::new(x, y, z));
    }

    // Indices of a small grid are unique and dense
    #[test]
    fn indices_cover_grid(xm in 1i32..=6, ym in 1i32..=6, zm in 1i32..=6) {
        let total = (xm * ym * zm) as usize;
        let mut seen = vec![false; total];
        for z in 0..zm { for y in 0..ym { for x in 0..xm {
            let i = to_1d(x, y, z, xm, ym) as usize;
            prop_assert!(!seen[i]);
            seen[i] = true;
        }}}
        prop_assert!(seen.into_iter().all(|b| b));
    }

    // Any negative component is outside
    #[test]
    fn negative_is_outside(x in -50i32..50, y in -50i32..50, z in -50i32..50) {
        let negative = x < 0 || y < 0 || z < 0;
        prop_assert_eq!(to_1d(x, y, z, 64, 64) == OUTSIDE, negative);
        prop_assert_eq!(chunk_of(x, y, z, 8, 9, 9) == OUTSIDE, negative);
    }

    // Every voxel of a chunk's bounds maps back to that chunk
    #[test]
    fn chunk_bounds_agree(xm in dim(), ym in dim(), zm in dim(), chunk_dim in 1i32..=9) {
        let geometry = GridGeometry::new(IVec3::new(xm, ym, zm), 1.0, chunk_dim).unwrap();
        let mut covered = 0usize;
        for chunk in 0..geometry.chunk_count() as i32 {
            geometry.for_each_in_chunk(chunk, |p| {
                assert_eq!(geometry.chunk_of(p.x, p.y, p.z), chunk);
                covered += 1;
            });
        }
        prop_assert_eq!(covered, geometry.voxel_count());
    }
}
