use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use dusk_core::constants::LAND_NODE_NAME;
use dusk_core::{LandscapeConfig, Ray, RecordId, Rgb};
use dusk_persist::{read_file_header, write_file_header};
use glam::Vec3;

use crate::error::LandscapeError;
use crate::record::LandscapeRecord;
use crate::scene::SceneGraph;
use crate::sync::RenderSyncQueue;

/// Outcome of one render-sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Records whose mesh was rebuilt.
    pub updated: usize,
    /// Records whose rebuild failed. They are not re-enqueued.
    pub failed: usize,
}

/// Closest ray hit across all records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub record: RecordId,
    pub point: Vec3,
    pub distance: f32,
}

/// The record table: every landscape tile of a level, plus the render-sync
/// queue that batches mesh rebuilds.
///
/// Records are stored densely and addressed by [`RecordId`]. Destroying a
/// record moves the last record into its slot, so slot indices are not
/// stable across destroys while ids are.
#[derive(Debug)]
pub struct Landscape {
    records: Vec<LandscapeRecord>,
    slots: HashMap<RecordId, usize>,
    /// Logical capacity following the table's growth rule.
    capacity: usize,
    queue: RenderSyncQueue,
    config: Arc<LandscapeConfig>,
}

impl Default for Landscape {
    fn default() -> Self {
        Self::new()
    }
}

impl Landscape {
    pub fn new() -> Self {
        Self::with_config(LandscapeConfig::default())
    }

    pub fn with_config(config: LandscapeConfig) -> Self {
        Self {
            records: Vec::new(),
            slots: HashMap::new(),
            capacity: 0,
            queue: RenderSyncQueue::new(),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &LandscapeConfig {
        &self.config
    }

    pub fn records_available(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn records(&self) -> impl Iterator<Item = &LandscapeRecord> {
        self.records.iter()
    }

    /// Record in slot `index`. Slots shift when records are destroyed.
    pub fn record_by_index(&self, index: usize) -> Option<&LandscapeRecord> {
        self.records.get(index)
    }

    pub fn record_by_id(&self, id: RecordId) -> Option<&LandscapeRecord> {
        self.slots.get(&id).map(|&slot| &self.records[slot])
    }

    /// Mutable access to a record. Mutations on an enabled record are picked
    /// up by the next [`Landscape::update_records`].
    pub fn record_by_id_mut(&mut self, id: RecordId) -> Option<&mut LandscapeRecord> {
        self.slots.get(&id).map(|&slot| &mut self.records[slot])
    }

    fn grown_capacity(&self) -> usize {
        if self.capacity < self.config.growth_doubling_limit {
            self.capacity * 2 + 1
        } else {
            self.capacity + self.config.growth_step
        }
    }

    fn set_capacity(&mut self, new_size: usize) {
        if new_size < self.records.len() {
            return;
        }
        if new_size > self.records.capacity() {
            self.records.reserve_exact(new_size - self.records.len());
        } else {
            self.records.shrink_to(new_size);
        }
        self.capacity = new_size;
    }

    /// Append a new empty record, growing the table if it is full.
    pub fn create_record(&mut self) -> RecordId {
        if self.records.len() == self.capacity {
            let grown = self.grown_capacity();
            log::debug!("Landscape::create_record: growing table from {} to {grown}", self.capacity);
            self.set_capacity(grown);
        }
        let record = LandscapeRecord::with_config(Arc::clone(&self.config));
        let id = record.id();
        self.slots.insert(id, self.records.len());
        self.records.push(record);
        id
    }

    /// Destroy a record, detaching its mesh first. The last record moves into
    /// the vacated slot.
    pub fn destroy_record(&mut self, scene: &mut dyn SceneGraph, id: RecordId) -> Result<(), LandscapeError> {
        let slot = self.slots.remove(&id).ok_or_else(|| {
            log::warn!("Landscape::destroy_record: no record with id {id}");
            LandscapeError::UnknownRecord(id)
        })?;
        let mut record = self.records.swap_remove(slot);
        if let Some(moved) = self.records.get(slot) {
            self.slots.insert(moved.id(), slot);
        }
        record.disable(scene)?;
        Ok(())
    }

    /// Resize the table to exactly `new_size` slots, destroying trailing
    /// records that no longer fit.
    pub fn change_capacity(&mut self, scene: &mut dyn SceneGraph, new_size: usize) -> Result<(), LandscapeError> {
        while self.records.len() > new_size {
            if let Some(last) = self.records.last() {
                let id = last.id();
                self.destroy_record(scene, id)?;
            }
        }
        self.set_capacity(new_size);
        Ok(())
    }

    /// Destroy every record and release the table's storage.
    pub fn clear_all_records(&mut self, scene: &mut dyn SceneGraph) -> Result<(), LandscapeError> {
        self.change_capacity(scene, 0)?;
        self.queue.clear();
        Ok(())
    }

    /// Drop every record without touching a scene. Only valid while no record
    /// is enabled.
    fn discard_all(&mut self) {
        debug_assert!(self.records.iter().all(|r| !r.is_enabled()));
        self.records.clear();
        self.slots.clear();
        self.set_capacity(0);
    }

    /// Load a landscape file into an empty table. Returns the number of
    /// records read. On a failure after the header, every record read so far
    /// is discarded.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<usize, LandscapeError> {
        let path = path.as_ref();
        if !self.records.is_empty() {
            log::warn!("Landscape::load_from_file: landscape data is already present");
            return Err(LandscapeError::RecordsPresent(self.records.len()));
        }

        let file = File::open(path).map_err(|source| {
            log::warn!(
                "Landscape::load_from_file: could not open file {:?} for reading",
                path.display()
            );
            LandscapeError::Io {
                path: path.display().to_string(),
                source,
            }
        })?;
        let mut reader = BufReader::new(file);

        let count = read_file_header(&mut reader, self.config.max_records).map_err(|e| {
            log::warn!("Landscape::load_from_file: file {:?} has invalid header: {e}", path.display());
            e
        })?;

        self.set_capacity(count as usize);
        for index in 0..count {
            let id = self.create_record();
            let loaded = match self.record_by_id_mut(id) {
                Some(record) => record.load_from_stream(&mut reader),
                None => Err(LandscapeError::UnknownRecord(id)),
            };
            if let Err(e) = loaded {
                log::warn!(
                    "Landscape::load_from_file: file {:?} has invalid data in record {}, \
                     clearing loaded data",
                    path.display(),
                    index + 1
                );
                self.discard_all();
                return Err(e);
            }
        }

        log::info!("Loaded {count} landscape records from {}", path.display());
        Ok(count as usize)
    }

    /// Write every record to `path`. On failure the file contents must not
    /// be trusted.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), LandscapeError> {
        let path = path.as_ref();
        if self.records.is_empty() {
            log::warn!("Landscape::save_to_file: no landscape data is present");
            return Err(LandscapeError::NoRecords);
        }

        let io_error = |source| LandscapeError::Io {
            path: path.display().to_string(),
            source,
        };
        let file = File::create(path).map_err(|e| {
            log::warn!(
                "Landscape::save_to_file: could not open file {:?} for writing",
                path.display()
            );
            io_error(e)
        })?;
        let mut writer = BufWriter::new(file);

        write_file_header(&mut writer, self.records.len() as u32)?;
        for (index, record) in self.records.iter().enumerate() {
            record.save_to_stream(&mut writer).map_err(|e| {
                log::error!(
                    "Landscape::save_to_file: error while writing record {} to {:?}",
                    index + 1,
                    path.display()
                );
                e
            })?;
        }
        writer.flush().map_err(io_error)?;

        log::info!("Saved {} landscape records to {}", self.records.len(), path.display());
        Ok(())
    }

    /// Record covering the world point. Where records overlap, the one with
    /// the smallest id wins.
    pub fn record_at_position(&self, x: f32, z: f32) -> Option<&LandscapeRecord> {
        self.records
            .iter()
            .filter(|record| record.covers(x, z))
            .min_by_key(|record| record.id())
    }

    /// Interpolated terrain height at a world point, or 0.0 where no record
    /// covers it.
    pub fn height_at_position(&self, x: f32, z: f32) -> f32 {
        self.record_at_position(x, z)
            .and_then(|record| record.height_at(x, z))
            .unwrap_or(0.0)
    }

    /// Build and attach meshes for every record. Creates the landscape node
    /// if needed. Returns the number of records enabled.
    pub fn send_to_engine(&mut self, scene: &mut dyn SceneGraph, wireframe: bool) -> Result<usize, LandscapeError> {
        if self.records.is_empty() {
            log::warn!("Landscape::send_to_engine: no landscape data is present");
            return Err(LandscapeError::NoRecords);
        }
        if !scene.has_node(LAND_NODE_NAME) {
            scene.create_child_node(LAND_NODE_NAME);
        }

        let mut enabled = 0;
        for record in &mut self.records {
            match record.enable(scene, wireframe) {
                Ok(()) => enabled += 1,
                Err(e) => log::warn!("Landscape::send_to_engine: record {}: {e}", record.id()),
            }
        }
        Ok(enabled)
    }

    /// Detach every record's mesh and remove the landscape node. Pending
    /// rebuilds are dropped along with the meshes.
    pub fn remove_from_engine(&mut self, scene: &mut dyn SceneGraph) -> Result<(), LandscapeError> {
        for record in &mut self.records {
            record.disable(scene)?;
        }
        self.queue.clear();
        if scene.has_node(LAND_NODE_NAME) {
            scene.remove_child_node(LAND_NODE_NAME);
        }
        Ok(())
    }

    /// Enqueue a record for rebuild. Returns false if it already was the
    /// last entry queued.
    pub fn request_update(&mut self, id: RecordId) -> Result<bool, LandscapeError> {
        if !self.slots.contains_key(&id) {
            log::warn!("Landscape::request_update: no record with id {id}");
            return Err(LandscapeError::UnknownRecord(id));
        }
        Ok(self.queue.push(id))
    }

    /// Number of entries waiting in the render-sync queue.
    pub fn pending_updates(&self) -> usize {
        self.queue.len()
    }

    pub fn needs_update(&self) -> bool {
        !self.queue.is_empty() || self.records.iter().any(|r| r.has_sync_request())
    }

    fn collect_sync_requests(&mut self) {
        for record in &mut self.records {
            if record.take_sync_request() {
                self.queue.push(record.id());
            }
        }
    }

    /// Drain the render-sync queue, rebuilding each queued record at most
    /// once. Failed rebuilds are counted and dropped.
    pub fn update_records(&mut self, scene: &mut dyn SceneGraph, wireframe: bool) -> SyncReport {
        self.collect_sync_requests();

        let pending: Vec<RecordId> = self.queue.drain().collect();
        let mut report = SyncReport::default();
        let mut done = HashSet::with_capacity(pending.len());
        for id in pending {
            if !done.insert(id) {
                continue;
            }
            let Some(&slot) = self.slots.get(&id) else {
                log::debug!("Landscape::update_records: record {id} no longer exists");
                continue;
            };
            let record = &mut self.records[slot];
            match record.update(scene, wireframe) {
                Ok(()) => report.updated += 1,
                Err(e) => {
                    log::warn!("Landscape::update_records: record {id}: {e}");
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Apply `f` to a record and queue it for rebuild if it is enabled.
    pub fn edit<T>(
        &mut self,
        id: RecordId,
        f: impl FnOnce(&mut LandscapeRecord) -> T,
    ) -> Result<T, LandscapeError> {
        let record = self.record_by_id_mut(id).ok_or_else(|| {
            log::warn!("Landscape::edit: no record with id {id}");
            LandscapeError::UnknownRecord(id)
        })?;
        let result = f(record);
        if record.take_sync_request() {
            self.queue.push(id);
        }
        Ok(result)
    }

    /// Raise or lower the terrain at a world point.
    pub fn terraform_at(&mut self, x: f32, z: f32, delta: f32) -> Result<RecordId, LandscapeError> {
        let id = self
            .record_at_position(x, z)
            .map(LandscapeRecord::id)
            .ok_or_else(|| {
                log::warn!("Landscape::terraform_at: no record covers ({x}, {z})");
                LandscapeError::NoRecordAt { x, z }
            })?;
        self.edit(id, |record| record.terraform(x, z, delta))??;
        Ok(id)
    }

    /// Paint the terrain colour at a world point.
    pub fn paint_at(&mut self, x: f32, z: f32, rgb: Rgb) -> Result<RecordId, LandscapeError> {
        let id = self
            .record_at_position(x, z)
            .map(LandscapeRecord::id)
            .ok_or_else(|| {
                log::warn!("Landscape::paint_at: no record covers ({x}, {z})");
                LandscapeError::NoRecordAt { x, z }
            })?;
        self.edit(id, |record| record.set_colour(x, z, rgb))??;
        Ok(id)
    }

    /// Closest hit of `ray` against every loaded record.
    pub fn pick(&self, ray: &Ray) -> Option<PickHit> {
        self.records
            .iter()
            .filter_map(|record| {
                record.ray_distance(ray).map(|distance| PickHit {
                    record: record.id(),
                    point: ray.at(distance),
                    distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
