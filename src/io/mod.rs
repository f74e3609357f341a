//! Volume persistence

pub mod volume_file;

pub use volume_file::{decode, encode, load, load_sync, save, save_sync};
