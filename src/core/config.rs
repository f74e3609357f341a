//! Volume configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::Result;

/// Default world units per voxel edge
pub const DEFAULT_SCALE: f32 = 0.25;
/// Default voxels per chunk edge
pub const DEFAULT_CHUNK_DIM: i32 = 16;
/// Default number of undo entries kept
pub const DEFAULT_UNDO_CAPACITY: usize = 262_144;

/// Construction parameters for a [`crate::volume::Volume`]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VolumeConfig {
    /// Grid dimensions in voxels (x, y, z)
    pub dims: [i32; 3],
    /// World units per voxel edge. Values <= 0 are replaced by 1.0.
    pub scale: f32,
    /// Voxels per chunk edge
    pub chunk_dim: i32,
    /// Ring buffer capacity of the undo log
    pub undo_capacity: usize,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            dims: [64, 64, 64],
            scale: DEFAULT_SCALE,
            chunk_dim: DEFAULT_CHUNK_DIM,
            undo_capacity: DEFAULT_UNDO_CAPACITY,
        }
    }
}

impl VolumeConfig {
    /// Config for a grid of the given size, other fields default
    pub fn with_dims(x: i32, y: i32, z: i32) -> Self {
        Self {
            dims: [x, y, z],
            ..Default::default()
        }
    }

    /// Save to file as pretty JSON (sync)
    pub fn save_sync(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from file (sync)
    pub fn load_sync(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VolumeConfig::default();
        assert_eq!(config.scale, 0.25);
        assert_eq!(config.chunk_dim, 16);
        assert_eq!(config.undo_capacity, 262_144);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: VolumeConfig = serde_json::from_str(r#"{"dims":[8,4,2]}"#).unwrap();
        assert_eq!(config.dims, [8, 4, 2]);
        assert_eq!(config.chunk_dim, DEFAULT_CHUNK_DIM);
    }

    #[test]
    fn test_save_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("volume.json");

        let config = VolumeConfig {
            scale: 0.125,
            ..VolumeConfig::with_dims(7, 7, 7)
        };
        config.save_sync(&path).unwrap();

        let loaded = VolumeConfig::load_sync(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
