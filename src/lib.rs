//! voxvol - destructible voxel volume storage and edit engine
//!
//! A dense voxel grid with a lazily reconciled, chunk-grouped index of
//! visible voxels. Cutting, restoring and color filtering run their bulk
//! variants as fork-join rayon tasks over disjoint grid partitions.

pub mod core;
pub mod math;
pub mod voxel;
pub mod io;
pub mod volume;

pub use crate::core::{Error, Result, VolumeConfig};
pub use crate::volume::{Volume, VolumeEvent, VisibleView};
pub use crate::voxel::{Voxel, VoxelState};
