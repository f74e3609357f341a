//! Error types for the voxvol engine

use thiserror::Error;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    #[error("voxel ({x}, {y}, {z}) is outside the grid {dims:?}")]
    OutOfBounds { x: i32, y: i32, z: i32, dims: [i32; 3] },

    #[error("Invalid grid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Problems found while decoding a persisted volume
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("header truncated: {len} bytes, need 12")]
    TruncatedHeader { len: usize },

    #[error("invalid dimensions {x}x{y}x{z}")]
    InvalidDimensions { x: i32, y: i32, z: i32 },

    #[error("payload is {actual} bytes, expected {expected}")]
    PayloadLength { expected: usize, actual: usize },
}
