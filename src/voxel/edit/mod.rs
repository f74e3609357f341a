//! Voxel edit engines.
//!
//! Cutting and restoring write every point edit to the [`UndoLog`]; the
//! filter engine keeps only its last arguments. All engines borrow the
//! volume for the duration of one call chain and update its visibility
//! index as they go.

pub mod shell;
pub mod undo;
pub mod cutting;
pub mod restoring;
pub mod filter;

pub use cutting::CuttingEngine;
pub use restoring::RestoringEngine;
pub use filter::{FilterEngine, FilterState};
pub use shell::Shell;
pub use undo::{CmdKind, UndoLog, VoxelCmd};
