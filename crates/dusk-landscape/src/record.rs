use std::io::{Read, Write};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use dusk_core::constants::{GRID_CELLS, GRID_SIZE, LAND_NODE_NAME};
use dusk_core::math::{bilinear, ray_triangle};
use dusk_core::{HeightGrid, LandscapeConfig, Ray, RecordId, Rgb};
use dusk_persist::{read_land_block, write_land_block, LandBlock, PersistError};
use glam::Vec3;

use crate::error::LandscapeError;
use crate::generate::{ColourFunction, HeightFunction};
use crate::mesh::{build_solid, build_wireframe, TileView};
use crate::naming::mesh_name;
use crate::scene::SceneGraph;

static NEXT_RECORD_ID: AtomicU32 = AtomicU32::new(0);

fn next_record_id() -> RecordId {
    RecordId(NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed))
}

/// One 65x65 landscape tile: heights, colours, placement and render state.
///
/// Records are normally created and owned by [`crate::Landscape`]. Mutations
/// made while the record is enabled raise a sync request that the owning
/// table turns into a render-sync queue entry.
#[derive(Debug)]
pub struct LandscapeRecord {
    id: RecordId,
    block: LandBlock,
    highest: f32,
    lowest: f32,
    loaded: bool,
    /// Name of the attached mesh while enabled.
    attached: Option<String>,
    sync_requested: bool,
    config: Arc<LandscapeConfig>,
}

impl Default for LandscapeRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl LandscapeRecord {
    /// Empty record with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Arc::new(LandscapeConfig::default()))
    }

    pub fn with_config(config: Arc<LandscapeConfig>) -> Self {
        Self {
            id: next_record_id(),
            block: LandBlock {
                offset_x: 0.0,
                offset_y: 0.0,
                stride: config.default_stride,
                grid: HeightGrid::new(),
            },
            highest: 0.0,
            lowest: 0.0,
            loaded: false,
            attached: None,
            sync_requested: false,
            config,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn offset_x(&self) -> f32 {
        self.block.offset_x
    }

    pub fn offset_y(&self) -> f32 {
        self.block.offset_y
    }

    pub fn stride(&self) -> f32 {
        self.block.stride
    }

    pub fn highest(&self) -> f32 {
        self.highest
    }

    pub fn lowest(&self) -> f32 {
        self.lowest
    }

    pub fn grid(&self) -> &HeightGrid {
        &self.block.grid
    }

    /// Whether the record holds valid height and colour data.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether a mesh for this record is attached to a scene.
    pub fn is_enabled(&self) -> bool {
        self.attached.is_some()
    }

    pub fn is_plain(&self) -> bool {
        self.highest == self.lowest
    }

    pub fn mesh_name(&self) -> String {
        mesh_name(self.id)
    }

    /// World-space side length covered by the record.
    pub fn extent(&self) -> f32 {
        GRID_CELLS as f32 * self.block.stride
    }

    pub fn tile(&self) -> TileView<'_> {
        TileView {
            offset_x: self.block.offset_x,
            offset_y: self.block.offset_y,
            stride: self.block.stride,
            grid: &self.block.grid,
        }
    }

    fn mark_changed(&mut self) {
        if self.is_enabled() {
            self.sync_requested = true;
        }
    }

    /// Take the pending sync request, if any.
    pub(crate) fn take_sync_request(&mut self) -> bool {
        std::mem::take(&mut self.sync_requested)
    }

    pub(crate) fn has_sync_request(&self) -> bool {
        self.sync_requested
    }

    fn recompute_bounds(&mut self) {
        let (lowest, highest) = self.block.grid.min_max();
        self.lowest = lowest;
        self.highest = highest;
    }

    /// Read this record from `reader`. The record must not hold data yet.
    ///
    /// A non-positive stride in the stream resets the stride to the
    /// configured default and still fails.
    pub fn load_from_stream(&mut self, reader: &mut impl Read) -> Result<(), LandscapeError> {
        if self.loaded {
            log::warn!("LandscapeRecord::load_from_stream: record {} already contains data", self.id);
            return Err(LandscapeError::AlreadyLoaded(self.id));
        }

        match read_land_block(reader) {
            Ok(block) => {
                self.block = block;
                self.recompute_bounds();
                self.loaded = true;
                Ok(())
            }
            Err(PersistError::InvalidStride(stride)) => {
                log::warn!(
                    "LandscapeRecord::load_from_stream: invalid stride {stride}, \
                     setting default value {}",
                    self.config.default_stride
                );
                self.block.stride = self.config.default_stride;
                Err(PersistError::InvalidStride(stride).into())
            }
            Err(e) => {
                log::warn!("LandscapeRecord::load_from_stream: {e}");
                Err(e.into())
            }
        }
    }

    /// Write this record to `writer` in the landscape file layout.
    pub fn save_to_stream(&self, writer: &mut impl Write) -> Result<(), LandscapeError> {
        if !self.loaded {
            log::warn!("LandscapeRecord::save_to_stream: record {} is not loaded", self.id);
            return Err(LandscapeError::NotLoaded(self.id));
        }
        write_land_block(writer, &self.block).map_err(|e| {
            log::error!("LandscapeRecord::save_to_stream: error while writing record {}: {e}", self.id);
            e.into()
        })
    }

    /// Raise (or lower, for negative `delta`) every height sample.
    pub fn shift(&mut self, delta: f32) {
        self.block.grid.map_heights(|h| h + delta);
        self.highest += delta;
        self.lowest += delta;
        self.mark_changed();
    }

    /// Multiply every height sample by `factor`.
    pub fn scale(&mut self, factor: f32) -> Result<(), LandscapeError> {
        if !self.loaded {
            log::warn!("LandscapeRecord::scale: record {} is not loaded", self.id);
            return Err(LandscapeError::NotLoaded(self.id));
        }
        if !(factor >= self.config.min_scale) {
            log::warn!("LandscapeRecord::scale: scaling factor {factor} is invalid");
            return Err(LandscapeError::ScaleTooSmall {
                factor,
                min: self.config.min_scale,
            });
        }
        self.block.grid.map_heights(|h| h * factor);
        self.highest *= factor;
        self.lowest *= factor;
        self.mark_changed();
        Ok(())
    }

    /// Flatten the record at `value` and mark it loaded.
    pub fn make_plain(&mut self, value: f32) {
        self.block.grid.fill_heights(value);
        self.highest = value;
        self.lowest = value;
        self.loaded = true;
        self.mark_changed();
    }

    /// Fill the heights from `generator`, evaluated at `(i / 64, j / 64)` for
    /// every grid point, and mark the record loaded.
    pub fn generate_by_function<H>(&mut self, generator: &mut H)
    where
        H: HeightFunction + ?Sized,
    {
        let mut highest = f32::NEG_INFINITY;
        let mut lowest = f32::INFINITY;
        for i in 0..GRID_SIZE {
            for j in 0..GRID_SIZE {
                let h = generator.height(
                    i as f32 / GRID_CELLS as f32,
                    j as f32 / GRID_CELLS as f32,
                );
                self.block.grid.set_height(i, j, h);
                highest = highest.max(h);
                lowest = lowest.min(h);
            }
        }
        self.highest = highest;
        self.lowest = lowest;
        self.loaded = true;
        self.mark_changed();
    }

    /// Repaint the colours from `painter`. Heights and the loaded state are
    /// left alone.
    pub fn colour_by_function<C>(&mut self, painter: &mut C)
    where
        C: ColourFunction + ?Sized,
    {
        for i in 0..GRID_SIZE {
            for j in 0..GRID_SIZE {
                let rgb = painter.colour(
                    i as f32 / GRID_CELLS as f32,
                    j as f32 / GRID_CELLS as f32,
                );
                self.block.grid.set_colour(i, j, rgb);
            }
        }
        self.mark_changed();
    }

    /// Move the record's origin to `(offset_x, offset_y)`.
    pub fn move_to(&mut self, offset_x: f32, offset_y: f32) {
        self.block.offset_x = offset_x;
        self.block.offset_y = offset_y;
        self.mark_changed();
    }

    /// Whether the world point lies inside the covered rectangle, edges included.
    pub fn covers(&self, x: f32, z: f32) -> bool {
        let extent = self.extent();
        x >= self.block.offset_x
            && x <= self.block.offset_x + extent
            && z >= self.block.offset_y
            && z <= self.block.offset_y + extent
    }

    /// Grid point at or below the world point, or None outside the record.
    fn cell_at(&self, x: f32, z: f32) -> Option<(usize, usize)> {
        if !self.covers(x, z) {
            return None;
        }
        let i = ((x - self.block.offset_x) / self.block.stride).floor() as usize;
        let j = ((z - self.block.offset_y) / self.block.stride).floor() as usize;
        Some((i.min(GRID_CELLS), j.min(GRID_CELLS)))
    }

    /// Add `delta` to the grid point under the world position.
    pub fn terraform(&mut self, x: f32, z: f32, delta: f32) -> Result<(), LandscapeError> {
        let (i, j) = self.cell_at(x, z).ok_or_else(|| {
            log::warn!("LandscapeRecord::terraform: ({x}, {z}) lies outside record {}", self.id);
            LandscapeError::OutOfBounds { id: self.id, x, z }
        })?;
        let h = self.block.grid.height(i, j) + delta;
        self.block.grid.set_height(i, j, h);
        if h > self.highest {
            self.highest = h;
        }
        if h < self.lowest {
            self.lowest = h;
        }
        self.mark_changed();
        Ok(())
    }

    /// Overwrite the colour of the grid point under the world position.
    pub fn set_colour(&mut self, x: f32, z: f32, rgb: Rgb) -> Result<(), LandscapeError> {
        let (i, j) = self.cell_at(x, z).ok_or_else(|| {
            log::warn!("LandscapeRecord::set_colour: ({x}, {z}) lies outside record {}", self.id);
            LandscapeError::OutOfBounds { id: self.id, x, z }
        })?;
        self.block.grid.set_colour(i, j, rgb);
        self.mark_changed();
        Ok(())
    }

    /// Bilinearly interpolated height at a world position, or None outside
    /// the record. On the last row or column the grid value is returned as is.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        let (i, j) = self.cell_at(x, z)?;
        let grid = &self.block.grid;
        if i == GRID_CELLS || j == GRID_CELLS {
            return Some(grid.height(i, j));
        }
        let stride = self.block.stride;
        let fx = (x - self.block.offset_x - i as f32 * stride) / stride;
        let fz = (z - self.block.offset_y - j as f32 * stride) / stride;
        Some(bilinear(
            grid.height(i, j),
            grid.height(i + 1, j),
            grid.height(i, j + 1),
            grid.height(i + 1, j + 1),
            fx,
            fz,
        ))
    }

    /// Build a mesh from the current data and attach it below the landscape node.
    pub fn enable(&mut self, scene: &mut dyn SceneGraph, wireframe: bool) -> Result<(), LandscapeError> {
        if self.is_enabled() {
            return Ok(());
        }
        if !self.loaded {
            log::warn!("LandscapeRecord::enable: record {} has no valid data (yet)", self.id);
            return Err(LandscapeError::NotLoaded(self.id));
        }
        if !scene.has_node(LAND_NODE_NAME) {
            log::warn!("LandscapeRecord::enable: {LAND_NODE_NAME} does not exist");
            return Err(LandscapeError::MissingLandNode(LAND_NODE_NAME.to_string()));
        }

        let name = self.mesh_name();
        let tile = self.tile();
        let mesh = if wireframe {
            build_wireframe(name.clone(), self.config.wireframe_colour, &tile)
        } else {
            build_solid(name.clone(), &self.config.land_material, &tile)
        };
        scene.create_mesh(mesh);
        if !scene.attach_mesh(LAND_NODE_NAME, &name) {
            log::warn!("LandscapeRecord::enable: could not attach {name} to {LAND_NODE_NAME}");
            scene.destroy_mesh(&name);
            return Err(LandscapeError::AttachFailed(name));
        }
        self.attached = Some(name);
        Ok(())
    }

    /// Detach and destroy the record's mesh. Succeeds if nothing is attached.
    pub fn disable(&mut self, scene: &mut dyn SceneGraph) -> Result<(), LandscapeError> {
        let Some(name) = self.attached.take() else {
            return Ok(());
        };
        if scene.has_node(LAND_NODE_NAME) {
            scene.detach_mesh(LAND_NODE_NAME, &name);
        } else {
            log::debug!("LandscapeRecord::disable: {LAND_NODE_NAME} already removed");
        }
        scene.destroy_mesh(&name);
        self.sync_requested = false;
        Ok(())
    }

    /// Rebuild the attached mesh from current data.
    pub fn update(&mut self, scene: &mut dyn SceneGraph, wireframe: bool) -> Result<(), LandscapeError> {
        self.disable(scene)?;
        self.enable(scene, wireframe)
    }

    /// Distance along `ray` to the closest triangle of this record.
    pub fn ray_distance(&self, ray: &Ray) -> Option<f32> {
        if !self.loaded {
            return None;
        }
        self.tile()
            .triangles()
            .filter_map(|triangle| ray_triangle(ray, triangle))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// World position where `ray` first hits this record, if it does.
    pub fn is_hit_by_ray(&self, ray: &Ray) -> Option<Vec3> {
        self.ray_distance(ray).map(|t| ray.at(t))
    }
}

impl Drop for LandscapeRecord {
    fn drop(&mut self) {
        if let Some(name) = &self.attached {
            log::warn!("landscape record {} dropped while mesh {name} is attached", self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MemoryScene;
    use std::io::Cursor;

    fn scene_with_node() -> MemoryScene {
        let mut scene = MemoryScene::new();
        scene.create_child_node(LAND_NODE_NAME);
        scene
    }

    /// Scene that registers meshes but never lets them be attached.
    #[derive(Default)]
    struct RefusingScene {
        inner: MemoryScene,
    }

    impl SceneGraph for RefusingScene {
        fn has_node(&self, name: &str) -> bool {
            self.inner.has_node(name)
        }
        fn create_child_node(&mut self, name: &str) {
            self.inner.create_child_node(name)
        }
        fn remove_child_node(&mut self, name: &str) {
            self.inner.remove_child_node(name)
        }
        fn create_mesh(&mut self, mesh: crate::mesh::Mesh) {
            self.inner.create_mesh(mesh)
        }
        fn attach_mesh(&mut self, _node: &str, _mesh_name: &str) -> bool {
            false
        }
        fn detach_mesh(&mut self, node: &str, mesh_name: &str) {
            self.inner.detach_mesh(node, mesh_name)
        }
        fn destroy_mesh(&mut self, mesh_name: &str) {
            self.inner.destroy_mesh(mesh_name)
        }
    }

    fn ramp(x: f32, z: f32) -> f32 {
        x * 10.0 - z * 4.0
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let a = LandscapeRecord::new();
        let b = LandscapeRecord::new();
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_new_record_is_empty() {
        let rec = LandscapeRecord::new();
        assert!(!rec.is_loaded());
        assert!(!rec.is_enabled());
        assert_eq!(rec.stride(), 5.0);
        assert_eq!(rec.extent(), 320.0);
    }

    #[test]
    fn test_save_load_roundtrip_is_byte_exact() {
        let mut rec = LandscapeRecord::new();
        rec.generate_by_function(&mut ramp);
        rec.colour_by_function(&mut |x: f32, z: f32| [(x * 255.0) as u8, (z * 255.0) as u8, 9]);
        rec.move_to(-325.0, 650.0);

        let mut bytes = Vec::new();
        rec.save_to_stream(&mut bytes).expect("save should succeed");

        let mut copy = LandscapeRecord::new();
        copy.load_from_stream(&mut Cursor::new(&bytes)).expect("load should succeed");
        assert_eq!(copy.grid(), rec.grid());
        assert_eq!(copy.offset_x(), -325.0);
        assert_eq!(copy.offset_y(), 650.0);
        assert_eq!(copy.stride(), rec.stride());
        assert_eq!(copy.highest(), rec.highest());
        assert_eq!(copy.lowest(), rec.lowest());

        let mut again = Vec::new();
        copy.save_to_stream(&mut again).expect("save should succeed");
        assert_eq!(again, bytes);
    }

    #[test]
    fn test_load_into_loaded_record_fails() {
        let mut rec = LandscapeRecord::new();
        rec.make_plain(1.0);
        let mut bytes = Vec::new();
        rec.save_to_stream(&mut bytes).expect("save should succeed");
        let result = rec.load_from_stream(&mut Cursor::new(&bytes));
        assert!(matches!(result, Err(LandscapeError::AlreadyLoaded(_))));
    }

    #[test]
    fn test_invalid_stride_resets_to_default() {
        let mut rec = LandscapeRecord::new();
        rec.make_plain(1.0);
        let mut bytes = Vec::new();
        rec.save_to_stream(&mut bytes).expect("save should succeed");
        bytes[12..16].copy_from_slice(&(-2.0f32).to_le_bytes());

        let config = LandscapeConfig {
            default_stride: 2.5,
            ..LandscapeConfig::default()
        };
        let mut copy = LandscapeRecord::with_config(Arc::new(config));
        let result = copy.load_from_stream(&mut Cursor::new(&bytes));
        assert!(matches!(
            result,
            Err(LandscapeError::Persist(PersistError::InvalidStride(_)))
        ));
        assert_eq!(copy.stride(), 2.5);
        assert!(!copy.is_loaded());
    }

    #[test]
    fn test_save_unloaded_fails() {
        let rec = LandscapeRecord::new();
        let mut bytes = Vec::new();
        assert!(matches!(
            rec.save_to_stream(&mut bytes),
            Err(LandscapeError::NotLoaded(_))
        ));
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_bounds_follow_mutations() {
        let mut rec = LandscapeRecord::new();
        rec.generate_by_function(&mut ramp);
        let check = |rec: &LandscapeRecord| {
            let (lo, hi) = rec.grid().min_max();
            assert!(rec.highest() >= rec.lowest());
            assert!((rec.highest() - hi).abs() < 1e-4, "{} vs {hi}", rec.highest());
            assert!((rec.lowest() - lo).abs() < 1e-4, "{} vs {lo}", rec.lowest());
        };
        check(&rec);
        assert_eq!(rec.highest(), 10.0);
        assert_eq!(rec.lowest(), -4.0);

        rec.shift(3.5);
        check(&rec);
        rec.scale(2.0).expect("scale should succeed");
        check(&rec);
        rec.make_plain(-8.0);
        check(&rec);
        assert!(rec.is_plain());
    }

    #[test]
    fn test_generate_all_negative_terrain() {
        let mut rec = LandscapeRecord::new();
        rec.generate_by_function(&mut |x: f32, z: f32| -10.0 - x - z);
        assert_eq!(rec.highest(), -10.0);
        assert_eq!(rec.lowest(), -12.0);
    }

    #[test]
    fn test_generate_all_positive_terrain() {
        let mut rec = LandscapeRecord::new();
        rec.generate_by_function(&mut |x: f32, _z: f32| 3.0 + x);
        assert_eq!(rec.lowest(), 3.0);
        assert_eq!(rec.highest(), 4.0);
    }

    #[test]
    fn test_generator_sees_normalized_domain() {
        let mut seen = Vec::new();
        let mut rec = LandscapeRecord::new();
        rec.generate_by_function(&mut |x: f32, z: f32| {
            seen.push((x, z));
            0.0
        });
        assert_eq!(seen.len(), 4225);
        assert_eq!(seen[0], (0.0, 0.0));
        assert_eq!(seen[1], (0.0, 1.0 / 64.0));
        assert_eq!(seen[4224], (1.0, 1.0));
    }

    #[test]
    fn test_scale_rejections() {
        let mut rec = LandscapeRecord::new();
        assert!(matches!(rec.scale(2.0), Err(LandscapeError::NotLoaded(_))));
        rec.make_plain(4.0);
        assert!(matches!(
            rec.scale(0.001),
            Err(LandscapeError::ScaleTooSmall { .. })
        ));
        assert!(rec.grid().heights().iter().all(|&h| h == 4.0));
        rec.scale(0.01).expect("minimum factor is accepted");
        assert!((rec.highest() - 0.04).abs() < 1e-6);
    }

    #[test]
    fn test_colour_by_function_keeps_heights() {
        let mut rec = LandscapeRecord::new();
        rec.colour_by_function(&mut |_x: f32, _z: f32| [1, 2, 3]);
        assert!(!rec.is_loaded());
        assert_eq!(rec.grid().colour(33, 12), [1, 2, 3]);
        assert_eq!(rec.highest(), 0.0);
    }

    #[test]
    fn test_terraform_inside_and_outside() {
        let mut rec = LandscapeRecord::new();
        rec.make_plain(0.0);
        rec.terraform(12.0, 7.0, 3.0).expect("inside the record");
        // floor(12 / 5) = 2, floor(7 / 5) = 1
        assert_eq!(rec.grid().height(2, 1), 3.0);
        assert_eq!(rec.highest(), 3.0);
        rec.terraform(320.0, 320.0, -2.0).expect("far corner is inside");
        assert_eq!(rec.grid().height(64, 64), -2.0);
        assert_eq!(rec.lowest(), -2.0);

        let before = rec.grid().clone();
        for (x, z) in [(-0.1, 5.0), (320.1, 5.0), (5.0, -1.0), (5.0, 400.0)] {
            assert!(matches!(
                rec.terraform(x, z, 1.0),
                Err(LandscapeError::OutOfBounds { .. })
            ));
        }
        assert_eq!(rec.grid(), &before);
    }

    #[test]
    fn test_set_colour() {
        let mut rec = LandscapeRecord::new();
        rec.move_to(100.0, 200.0);
        rec.set_colour(104.9, 210.0, [9, 8, 7]).expect("inside the record");
        assert_eq!(rec.grid().colour(0, 2), [9, 8, 7]);
        assert!(rec.set_colour(0.0, 0.0, [1, 1, 1]).is_err());
    }

    #[test]
    fn test_height_at_interpolates() {
        let mut rec = LandscapeRecord::new();
        rec.generate_by_function(&mut |x: f32, z: f32| x * 64.0 + z * 128.0);
        // Height[i][j] = i + 2j, a plane, so interpolation is exact-ish
        let h = rec.height_at(7.5, 12.5).expect("inside");
        assert!((h - (1.5 + 5.0)).abs() < 1e-4, "got {h}");
        assert_eq!(rec.height_at(320.0, 0.0), Some(64.0));
        assert_eq!(rec.height_at(-1.0, 0.0), None);
    }

    #[test]
    fn test_enable_requires_data_and_node() {
        let mut rec = LandscapeRecord::new();
        let mut scene = MemoryScene::new();
        assert!(matches!(
            rec.enable(&mut scene, false),
            Err(LandscapeError::NotLoaded(_))
        ));
        rec.make_plain(0.0);
        assert!(matches!(
            rec.enable(&mut scene, false),
            Err(LandscapeError::MissingLandNode(_))
        ));
        assert_eq!(scene.mesh_count(), 0);
        assert!(!rec.is_enabled());
    }

    #[test]
    fn test_refused_attach_leaves_nothing_behind() {
        let mut rec = LandscapeRecord::new();
        rec.make_plain(1.0);
        let mut scene = RefusingScene::default();
        scene.create_child_node(LAND_NODE_NAME);

        match rec.enable(&mut scene, false) {
            Err(LandscapeError::AttachFailed(name)) => assert_eq!(name, rec.mesh_name()),
            other => panic!("expected AttachFailed, got {other:?}"),
        }
        assert!(!rec.is_enabled());
        assert!(scene.inner.attached(LAND_NODE_NAME).is_empty());
        assert_eq!(scene.inner.mesh_count(), 0);
        assert_eq!(scene.inner.meshes_created(), 1);
    }

    #[test]
    fn test_enable_disable_cycle() {
        let mut rec = LandscapeRecord::new();
        rec.make_plain(2.0);
        let mut scene = scene_with_node();

        rec.enable(&mut scene, false).expect("enable should succeed");
        assert!(rec.is_enabled());
        assert_eq!(scene.attached(LAND_NODE_NAME), &[rec.mesh_name()]);
        let mesh = scene.mesh(&rec.mesh_name()).expect("mesh registered");
        assert_eq!(mesh.primitive_count(), 64 * 64 * 2);

        // Second enable is a no-op
        rec.enable(&mut scene, true).expect("no-op");
        assert_eq!(scene.meshes_created(), 1);

        rec.disable(&mut scene).expect("disable should succeed");
        assert!(!rec.is_enabled());
        assert_eq!(scene.mesh_count(), 0);
        rec.disable(&mut scene).expect("disable twice is fine");
    }

    #[test]
    fn test_update_rebuilds_with_new_data() {
        let mut rec = LandscapeRecord::new();
        rec.make_plain(0.0);
        let mut scene = scene_with_node();
        rec.enable(&mut scene, false).expect("enable");
        rec.shift(5.0);
        assert!(rec.has_sync_request());
        rec.update(&mut scene, true).expect("update");
        assert!(!rec.has_sync_request());
        assert_eq!(scene.meshes_created(), 2);
        let mesh = scene.mesh(&rec.mesh_name()).expect("mesh registered");
        assert_eq!(mesh.vertices[0].position[1], 5.0);
        assert_eq!(mesh.indices.len(), 2 * 2 * 65 * 64);
        rec.disable(&mut scene).expect("disable");
    }

    #[test]
    fn test_mutations_only_request_sync_when_enabled() {
        let mut rec = LandscapeRecord::new();
        rec.make_plain(0.0);
        rec.shift(1.0);
        assert!(!rec.has_sync_request());

        let mut scene = scene_with_node();
        rec.enable(&mut scene, false).expect("enable");
        rec.terraform(3.0, 3.0, 1.0).expect("inside");
        assert!(rec.take_sync_request());
        assert!(!rec.take_sync_request());
        rec.disable(&mut scene).expect("disable");
    }

    #[test]
    fn test_ray_hits_closest_point() {
        let mut rec = LandscapeRecord::new();
        rec.make_plain(7.0);
        let ray = Ray::new(Vec3::new(52.5, 100.0, 61.0), Vec3::NEG_Y);
        let hit = rec.is_hit_by_ray(&ray).expect("ray should hit");
        assert!(hit.abs_diff_eq(Vec3::new(52.5, 7.0, 61.0), 1e-3), "got {hit}");
    }

    #[test]
    fn test_ray_misses() {
        let mut rec = LandscapeRecord::new();
        assert!(rec
            .is_hit_by_ray(&Ray::new(Vec3::new(5.0, 10.0, 5.0), Vec3::NEG_Y))
            .is_none());
        rec.make_plain(0.0);
        let outside = Ray::new(Vec3::new(-50.0, 10.0, 5.0), Vec3::NEG_Y);
        assert!(rec.is_hit_by_ray(&outside).is_none());
        let upward = Ray::new(Vec3::new(5.0, 10.0, 5.0), Vec3::Y);
        assert!(rec.is_hit_by_ray(&upward).is_none());
    }

    #[test]
    fn test_slanted_ray_picks_nearest_surface() {
        let mut rec = LandscapeRecord::new();
        // A ridge along i = 32 that a low, slanted ray hits before the far slope
        rec.generate_by_function(&mut |x: f32, _z: f32| 20.0 - (x - 0.5).abs() * 40.0);
        let ray = Ray::new(Vec3::new(-10.0, 10.5, 102.5), Vec3::X);
        let hit = rec.is_hit_by_ray(&ray).expect("ray should hit the ridge");
        // Near slope: 20 - |x/320 - 0.5| * 40 = 10.5  =>  x = 84
        assert!((hit.x - 84.0).abs() < 1e-2, "got {hit}");
    }
}
