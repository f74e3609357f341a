//! Bit-packed volume file format.
//!
//! Layout (little-endian): three `i32` grid dimensions, then one 10-bit
//! record per voxel in linear grid order. Each record holds the state in
//! bits 0-1 and the color in bits 2-9, packed LSB-first and padded to a
//! whole byte.

use std::path::Path;
use std::time::Instant;

use glam::IVec3;

use crate::core::error::FormatError;
use crate::core::types::Result;
use crate::voxel::dense::DenseStore;
use crate::voxel::geometry::GridGeometry;
use crate::voxel::volume_data::VolumeData;
use crate::voxel::voxel::{Voxel, VoxelState};

/// Header size in bytes
pub const HEADER_LEN: usize = 12;
/// Bits per voxel record
pub const RECORD_BITS: usize = 10;

const RECORD_MASK: u64 = (1 << RECORD_BITS) - 1;

/// Payload bytes needed for `count` records
pub fn payload_len(count: usize) -> usize {
    (count * RECORD_BITS).div_ceil(8)
}

/// Serialize the dense store of a volume
pub fn encode(data: &VolumeData) -> Vec<u8> {
    let dims = data.geometry().dims();
    let voxels = data.dense().as_slice();
    let mut out = Vec::with_capacity(HEADER_LEN + payload_len(voxels.len()));

    out.extend_from_slice(&dims.x.to_le_bytes());
    out.extend_from_slice(&dims.y.to_le_bytes());
    out.extend_from_slice(&dims.z.to_le_bytes());

    let mut acc: u64 = 0;
    let mut bits = 0usize;
    for voxel in voxels {
        let record = (voxel.state as u64) | ((voxel.color as u64) << 2);
        acc |= record << bits;
        bits += RECORD_BITS;
        while bits >= 8 {
            out.push(acc as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    if bits > 0 {
        out.push(acc as u8);
    }
    out
}

/// Rebuild a volume from bytes produced by [`encode`].
///
/// Every voxel keeps its stored state; visible voxels are registered with
/// the visibility index.
pub fn decode(bytes: &[u8], scale: f32, chunk_dim: i32) -> Result<VolumeData> {
    if bytes.len() < HEADER_LEN {
        return Err(FormatError::TruncatedHeader { len: bytes.len() }.into());
    }
    let (header, payload) = bytes.split_at(HEADER_LEN);
    let read_i32 = |at: usize| i32::from_le_bytes([header[at], header[at + 1], header[at + 2], header[at + 3]]);
    let (x, y, z) = (read_i32(0), read_i32(4), read_i32(8));

    if x <= 0 || y <= 0 || z <= 0 {
        return Err(FormatError::InvalidDimensions { x, y, z }.into());
    }
    let count = (x as usize)
        .checked_mul(y as usize)
        .and_then(|n| n.checked_mul(z as usize))
        .filter(|&n| n <= i32::MAX as usize)
        .ok_or(FormatError::InvalidDimensions { x, y, z })?;

    let expected = payload_len(count);
    if payload.len() != expected {
        return Err(FormatError::PayloadLength { expected, actual: payload.len() }.into());
    }

    let geometry = GridGeometry::new(IVec3::new(x, y, z), scale, chunk_dim)?;
    let mut voxels = Vec::with_capacity(count);
    let mut source = payload.iter();
    let mut acc: u64 = 0;
    let mut bits = 0usize;

    for idx in 0..count {
        while bits < RECORD_BITS {
            let Some(&byte) = source.next() else {
                return Err(FormatError::PayloadLength { expected, actual: payload.len() }.into());
            };
            acc |= (byte as u64) << bits;
            bits += 8;
        }
        let record = acc & RECORD_MASK;
        acc >>= RECORD_BITS;
        bits -= RECORD_BITS;

        let p = geometry.position(idx);
        voxels.push(Voxel::new(
            p.x,
            p.y,
            p.z,
            (record >> 2) as u8,
            VoxelState::from_bits(record as u8),
        ));
    }

    let mut data = VolumeData::from_dense(DenseStore::from_voxels(geometry, voxels));
    let (dense, visibility) = data.parts_mut();
    for voxel in dense.as_slice() {
        if voxel.state == VoxelState::Visible {
            visibility.mark_visible(*voxel);
        }
    }
    Ok(data)
}

/// Write a volume to `path`, replacing any existing file (sync)
pub fn save_sync(path: &Path, data: &VolumeData) -> Result<()> {
    let start = Instant::now();
    let bytes = encode(data);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &bytes)?;

    log::info!(
        "Saved {} bytes to {} in {:.1}ms",
        bytes.len(),
        path.display(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

/// Read a volume from `path` (sync)
pub fn load_sync(path: &Path, scale: f32, chunk_dim: i32) -> Result<VolumeData> {
    let bytes = std::fs::read(path)?;
    let data = decode(&bytes, scale, chunk_dim)?;
    log::info!("Loaded {} voxels from {}", data.geometry().voxel_count(), path.display());
    Ok(data)
}

/// Write a volume to `path` on the tokio runtime
pub async fn save(path: &Path, data: &VolumeData) -> Result<()> {
    let bytes = encode(data);

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// Read a volume from `path` on the tokio runtime
pub async fn load(path: &Path, scale: f32, chunk_dim: i32) -> Result<VolumeData> {
    let bytes = tokio::fs::read(path).await?;
    decode(&bytes, scale, chunk_dim)
}
