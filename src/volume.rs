//! Volume orchestrator: owns the voxel data, the undo log and the filter
//! state, hands out edit engines and drives the render/consume cycle.

use std::collections::HashSet;
use std::path::Path;

use crate::core::config::VolumeConfig;
use crate::core::types::{IVec3, Result};
use crate::io::volume_file;
use crate::voxel::edit::{CuttingEngine, FilterEngine, FilterState, RestoringEngine, UndoLog};
use crate::voxel::visibility::{VisibilityIndex, VisibilityStats};
use crate::voxel::volume_data::VolumeData;
use crate::voxel::voxel::Voxel;

/// Lifecycle notifications delivered to subscribers
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VolumeEvent {
    /// Voxel contents were (re)initialized or loaded
    Initialized,
    /// Scale changed to the given value
    ScaleChanged(f32),
    SavingStarted,
    SavingEnded,
}

/// Subscriber callback
pub type Observer = Box<dyn FnMut(&VolumeEvent) + Send>;

/// Read-only view of the reconciled visibility index for one cycle
pub struct VisibleView<'a> {
    index: &'a VisibilityIndex,
}

impl<'a> VisibleView<'a> {
    /// Chunks containing visible voxels
    pub fn chunks(&self) -> impl Iterator<Item = i32> + 'a {
        self.index.visible_chunks().iter().copied()
    }

    /// Visible voxels of one chunk
    pub fn voxels(&self, chunk: i32) -> &'a [Voxel] {
        self.index.chunk_voxels(chunk)
    }

    /// Chunks edited since the previous cycle
    pub fn touched_chunks(&self) -> &'a HashSet<i32> {
        self.index.touched_chunks()
    }

    pub fn stats(&self) -> VisibilityStats {
        self.index.stats()
    }
}

/// A destructible voxel volume with undo and change notifications
pub struct Volume {
    data: VolumeData,
    undo: UndoLog,
    filter_state: FilterState,
    observers: Vec<Observer>,
}

impl Volume {
    /// Allocate an uninitialized volume from a config
    pub fn from_config(config: &VolumeConfig) -> Result<Self> {
        let [x, y, z] = config.dims;
        let data = VolumeData::new(x, y, z, config.scale, config.chunk_dim)?;
        Ok(Self::from_data(data, config.undo_capacity))
    }

    /// Wrap existing voxel data
    pub fn from_data(data: VolumeData, undo_capacity: usize) -> Self {
        Self {
            data,
            undo: UndoLog::with_capacity(undo_capacity),
            filter_state: FilterState::default(),
            observers: Vec::new(),
        }
    }

    /// Register a callback for [`VolumeEvent`]s
    pub fn subscribe(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    fn emit(&mut self, event: VolumeEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }

    pub fn data(&self) -> &VolumeData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut VolumeData {
        &mut self.data
    }

    pub fn cutting(&mut self) -> CuttingEngine<'_> {
        CuttingEngine::new(&mut self.data, &mut self.undo)
    }

    pub fn restoring(&mut self) -> RestoringEngine<'_> {
        RestoringEngine::new(&mut self.data, &mut self.undo)
    }

    pub fn filter(&mut self) -> FilterEngine<'_> {
        FilterEngine::new(&mut self.data, &mut self.filter_state)
    }

    /// Revert every logged edit, newest first, and clear the log
    pub fn undo_voxels(&mut self) -> usize {
        self.undo.undo_voxels(&mut self.data)
    }

    /// Number of edits that [`Volume::undo_voxels`] would revert
    pub fn undo_size(&self) -> usize {
        self.undo.size()
    }

    /// Arguments of the last filter calls
    pub fn filter_state(&self) -> FilterState {
        self.filter_state
    }

    /// Fill with deterministic random colors and expose the outer shell
    pub fn init_random(&mut self, seed: u32) {
        self.data.init_random(seed);
        self.undo.clear();
        self.emit(VolumeEvent::Initialized);
    }

    /// Fill with one color and expose the outer shell
    pub fn init_solid(&mut self, color: u8) {
        self.data.init_solid(color);
        self.undo.clear();
        self.emit(VolumeEvent::Initialized);
    }

    /// Change the world size of a voxel
    pub fn set_scale(&mut self, scale: f32) {
        let applied = self.data.set_scale(scale);
        self.emit(VolumeEvent::ScaleChanged(applied));
    }

    /// Voxel under a volume-local position, if inside the grid
    pub fn voxel_at_local(&self, local: glam::Vec3) -> Option<Voxel> {
        let p: IVec3 = self.data.voxel_index_from_local(local)?;
        self.data.try_get_voxel(p.x, p.y, p.z)
    }

    /// Run one render cycle: reconcile the index, hand the consumer a
    /// read-only view, then reset the per-cycle chunk sets.
    pub fn render_cycle<R>(&mut self, consume: impl FnOnce(VisibleView<'_>) -> R) -> R {
        self.data.clean_dirty_data();
        let result = consume(VisibleView {
            index: self.data.visibility(),
        });
        self.data.reset_modified_chunks();
        result
    }

    /// Save to `path` (sync), bracketed by saving events
    pub fn save_sync(&mut self, path: &Path) -> Result<()> {
        self.emit(VolumeEvent::SavingStarted);
        let result = volume_file::save_sync(path, &self.data);
        self.emit(VolumeEvent::SavingEnded);
        result
    }

    /// Save to `path` on the tokio runtime, bracketed by saving events
    pub async fn save(&mut self, path: &Path) -> Result<()> {
        self.emit(VolumeEvent::SavingStarted);
        let result = volume_file::save(path, &self.data).await;
        self.emit(VolumeEvent::SavingEnded);
        result
    }

    /// Replace contents with the file at `path`, keeping scale and chunk size.
    /// Undo history is discarded.
    pub fn load_sync(&mut self, path: &Path) -> Result<()> {
        let geometry = *self.data.geometry();
        self.data = volume_file::load_sync(path, geometry.scale(), geometry.chunk_dim())?;
        self.undo.clear();
        self.emit(VolumeEvent::Initialized);
        Ok(())
    }

    /// Async variant of [`Volume::load_sync`]
    pub async fn load(&mut self, path: &Path) -> Result<()> {
        let geometry = *self.data.geometry();
        self.data = volume_file::load(path, geometry.scale(), geometry.chunk_dim()).await?;
        self.undo.clear();
        self.emit(VolumeEvent::Initialized);
        Ok(())
    }
}

impl std::fmt::Debug for Volume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Volume")
            .field("geometry", self.data.geometry())
            .field("undo_size", &self.undo.size())
            .field("filter_state", &self.filter_state)
            .field("observers", &self.observers.len())
            .finish()
    }
}
