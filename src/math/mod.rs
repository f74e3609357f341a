//! Grid coordinate math

pub mod grid_index;

pub use grid_index::{chunk_of, to_1d, to_3d, FACE_NEIGHBORS, OUTSIDE};
