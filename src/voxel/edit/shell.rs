//! Concentric cube shells used to partition cube edits.
//!
//! Every walk here is clipped to a half-open cell box `[min, max)` and does
//! its bound arithmetic in `i64`, so any `i32` center and radius is safe.

use std::ops::Range;

use glam::IVec3;

/// All cells at Chebyshev distance `radius` from `center`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shell {
    pub center: IVec3,
    pub radius: i32,
}

impl Shell {
    pub fn new(center: IVec3, radius: i32) -> Self {
        Self { center, radius }
    }

    /// Number of cells on the shell, ignoring clipping
    #[cfg(test)]
    pub fn cell_count(&self) -> usize {
        if self.radius <= 0 {
            return 1;
        }
        let outer = (2 * self.radius + 1) as usize;
        let inner = (2 * self.radius - 1) as usize;
        outer.pow(3) - inner.pow(3)
    }

    /// True if some cell of the shell lies inside `[min, max)`
    pub fn reaches(&self, min: IVec3, max: IVec3) -> bool {
        let (near, far) = chebyshev_span(self.center, min, max);
        (near..=far).contains(&i64::from(self.radius))
    }

    /// Visit each cell of the shell inside `[min, max)` exactly once.
    ///
    /// The two z faces are full squares, the x faces drop the z rims and the
    /// y faces drop both the z and x rims. Radius 0 is just the center.
    pub fn for_each_cell(&self, min: IVec3, max: IVec3, mut f: impl FnMut(IVec3)) {
        let [cx, cy, cz] = self.center.to_array().map(i64::from);
        let r = i64::from(self.radius);
        if r <= 0 {
            if inside(self.center, min, max) {
                f(self.center);
            }
            return;
        }

        let x_full = clip(cx - r, cx + r, min.x, max.x);
        let y_full = clip(cy - r, cy + r, min.y, max.y);
        let x_inner = clip(cx - r + 1, cx + r - 1, min.x, max.x);
        let z_inner = clip(cz - r + 1, cz + r - 1, min.z, max.z);

        // front and back
        for z in face(cz, r, min.z, max.z) {
            for x in x_full.clone() {
                for y in y_full.clone() {
                    f(IVec3::new(x, y, z));
                }
            }
        }

        // left and right
        for x in face(cx, r, min.x, max.x) {
            for z in z_inner.clone() {
                for y in y_full.clone() {
                    f(IVec3::new(x, y, z));
                }
            }
        }

        // top and bottom
        for y in face(cy, r, min.y, max.y) {
            for z in z_inner.clone() {
                for x in x_inner.clone() {
                    f(IVec3::new(x, y, z));
                }
            }
        }
    }
}

/// Shells `0..=radius` around `center` that reach `[min, max)`.
///
/// Together they fill the part of the cube inside the box. Shells that miss
/// the box are left out, so the count is bounded by the box extent.
pub fn cube_shells(center: IVec3, radius: i32, min: IVec3, max: IVec3) -> Vec<Shell> {
    let (near, far) = chebyshev_span(center, min, max);
    let last = far.min(i64::from(radius));
    (near..=last)
        .filter_map(|r| i32::try_from(r).ok())
        .map(|r| Shell::new(center, r))
        .collect()
}

/// Visit every cell of the half-open box `[center - radius, center + radius)`
/// inside `[min, max)` whose squared distance to `center` is strictly below
/// `radius²`.
pub fn for_each_sphere_cell(center: IVec3, radius: i32, min: IVec3, max: IVec3, mut f: impl FnMut(IVec3)) {
    if radius < 1 {
        return;
    }
    if radius == 1 {
        if inside(center, min, max) {
            f(center);
        }
        return;
    }

    let [cx, cy, cz] = center.to_array().map(i64::from);
    let r = i64::from(radius);
    let range_squared = i128::from(r * r);
    let distance = |a: i32, c: i64| i128::from(i64::from(a) - c);

    for z in clip(cz - r, cz + r - 1, min.z, max.z) {
        let dz = distance(z, cz);
        for y in clip(cy - r, cy + r - 1, min.y, max.y) {
            let dy = distance(y, cy);
            for x in clip(cx - r, cx + r - 1, min.x, max.x) {
                let dx = distance(x, cx);
                if dx * dx + dy * dy + dz * dz < range_squared {
                    f(IVec3::new(x, y, z));
                }
            }
        }
    }
}

/// Smallest and largest Chebyshev distance from `center` to a cell of `[min, max)`
fn chebyshev_span(center: IVec3, min: IVec3, max: IVec3) -> (i64, i64) {
    let mut near = 0;
    let mut far = 0;
    for axis in 0..3 {
        let c = i64::from(center[axis]);
        let lo = i64::from(min[axis]);
        let hi = i64::from(max[axis]) - 1;
        near = near.max(lo - c).max(c - hi);
        far = far.max((c - lo).abs()).max((hi - c).abs());
    }
    (near, far)
}

fn inside(p: IVec3, min: IVec3, max: IVec3) -> bool {
    p.cmpge(min).all() && p.cmplt(max).all()
}

/// Inclusive `[lo, hi]` intersected with `[min, max)`
fn clip(lo: i64, hi: i64, min: i32, max: i32) -> Range<i32> {
    let start = lo.max(i64::from(min));
    let end = (hi + 1).min(i64::from(max));
    if start >= end {
        return 0..0;
    }
    // Both ends lie within [min, max]
    start as i32..end as i32
}

/// The planes `c - r` and `c + r` that fall inside `[min, max)`
fn face(c: i64, r: i64, min: i32, max: i32) -> impl Iterator<Item = i32> {
    [c + r, c - r]
        .into_iter()
        .filter(move |&v| v >= i64::from(min) && v < i64::from(max))
        .map(|v| v as i32)
}
