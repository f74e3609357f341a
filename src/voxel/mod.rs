//! Voxel data structures and operations

pub mod voxel;
pub mod geometry;
pub mod dense;
pub mod visibility;
pub mod parallel;
pub mod volume_data;
pub mod edit;

pub use voxel::{Voxel, VoxelState};
pub use geometry::GridGeometry;
pub use dense::DenseStore;
pub use visibility::{VisibilityIndex, VisibilityStats};
pub use volume_data::VolumeData;
pub use edit::{CuttingEngine, FilterEngine, FilterState, RestoringEngine, UndoLog};
