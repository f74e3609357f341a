//! Bounded undo log of point edits.

use std::time::Instant;

use crate::core::config::DEFAULT_UNDO_CAPACITY;
use crate::voxel::volume_data::VolumeData;

use super::{cutting, restoring};

/// Which engine produced a command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmdKind {
    Cutting,
    Restoring,
}

/// One logged point edit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoxelCmd {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub kind: CmdKind,
}

impl VoxelCmd {
    pub fn cutting(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z, kind: CmdKind::Cutting }
    }

    pub fn restoring(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z, kind: CmdKind::Restoring }
    }
}

/// Fixed-capacity ring buffer of edit commands.
///
/// Once full, each write overwrites the oldest entry.
#[derive(Debug)]
pub struct UndoLog {
    entries: Vec<VoxelCmd>,
    capacity: usize,
    /// Slot the next write goes to
    cursor: usize,
    filled: bool,
}

impl UndoLog {
    /// Create an empty log holding at most `capacity` entries (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity.min(4096)),
            capacity,
            cursor: 0,
            filled: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a command, overwriting the oldest once full
    pub fn write(&mut self, cmd: VoxelCmd) {
        if self.cursor == self.capacity {
            self.cursor = 0;
            self.filled = true;
        }
        if self.filled {
            self.entries[self.cursor] = cmd;
        } else {
            self.entries.push(cmd);
        }
        self.cursor += 1;
    }

    /// Number of retained commands
    pub fn size(&self) -> usize {
        if self.filled { self.capacity } else { self.cursor }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Retained commands, newest first.
    ///
    /// Walks back from the cursor to slot 0, then from the end of the buffer
    /// down to the cursor. The second half is empty until the buffer wraps.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &VoxelCmd> + '_ {
        let (older, newer) = self.entries.split_at(self.cursor.min(self.entries.len()));
        older.iter().rev().chain(newer.iter().rev())
    }

    /// Discard all history
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
        self.filled = false;
    }

    /// Replay every retained command in reverse through the opposite engine,
    /// then clear the log. Replayed edits are not logged again.
    ///
    /// Returns the number of commands replayed.
    pub fn undo_voxels(&mut self, data: &mut VolumeData) -> usize {
        let start = Instant::now();
        let mut replayed = 0;

        for cmd in self.iter_newest_first() {
            match cmd.kind {
                CmdKind::Cutting => {
                    restoring::add_point(data, cmd.x, cmd.y, cmd.z);
                }
                CmdKind::Restoring => {
                    cutting::remove_point(data, cmd.x, cmd.y, cmd.z);
                }
            }
            replayed += 1;
        }
        self.clear();

        log::info!(
            "Undid {} edits in {:.1}ms",
            replayed,
            start.elapsed().as_secs_f64() * 1000.0
        );
        replayed
    }
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_UNDO_CAPACITY)
    }
}
