//! Voxel data type

use glam::IVec3;

/// Lifecycle state of a voxel
///
/// Discriminants match the 2-bit on-disk encoding.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VoxelState {
    /// Never initialized
    #[default]
    Unknown = 0,
    /// Present and fully enclosed
    Solid = 1,
    /// Cut away
    Removed = 2,
    /// Present and exposed to at least one empty face
    Visible = 3,
}

impl VoxelState {
    /// Decode from the low two bits
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            1 => Self::Solid,
            2 => Self::Removed,
            3 => Self::Visible,
            _ => Self::Unknown,
        }
    }

    /// Solid or Visible
    #[inline]
    pub fn is_present(self) -> bool {
        matches!(self, Self::Solid | Self::Visible)
    }
}

/// Single grid cell. Carries its own coordinates so visibility
/// snapshots can be handed to consumers without the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Voxel {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub color: u8,
    pub state: VoxelState,
}

impl Voxel {
    /// Voxel at `(x, y, z)` with the given color and state
    pub fn new(x: i32, y: i32, z: i32, color: u8, state: VoxelState) -> Self {
        Self { x, y, z, color, state }
    }

    /// Grid position
    #[inline]
    pub fn position(&self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    /// Same voxel with a different state
    #[inline]
    pub fn with_state(mut self, state: VoxelState) -> Self {
        self.state = state;
        self
    }

    /// Check if voxel occupies its cell
    #[inline]
    pub fn is_present(&self) -> bool {
        self.state.is_present()
    }
}
