//! Single source of truth for shared landscape constants.
//! `GRID_SIZE` is baked into the on-disk record layout and must not change.

/// Grid points per axis in one landscape record.
pub const GRID_SIZE: usize = 65;

/// Grid cells per axis (one less than the point count).
pub const GRID_CELLS: usize = GRID_SIZE - 1;

/// Total height samples per record (65 * 65).
pub const GRID_POINTS: usize = GRID_SIZE * GRID_SIZE;

/// Triangles in a solid record mesh (two per cell).
pub const GRID_TRIANGLES: usize = GRID_CELLS * GRID_CELLS * 2;

/// Stride used when none has been set, or when a loaded stride is invalid.
pub const DEFAULT_STRIDE: f32 = 5.0;

/// Smallest accepted factor for height scaling.
pub const MIN_SCALE: f32 = 0.01;

/// Upper bound on records declared by a landscape file (50 x 50 tiles).
pub const MAX_LAND_RECORDS: u32 = 2500;

/// Below this capacity the record table doubles when it grows.
pub const GROWTH_DOUBLING_LIMIT: usize = 500;

/// Fixed capacity increment once the doubling limit has been reached.
pub const GROWTH_STEP: usize = 100;

/// Name of the scene node grouping all landscape meshes.
pub const LAND_NODE_NAME: &str = "LandscapeNode";

/// Prefix of every generated landscape mesh name, followed by the record id.
pub const MESH_NAME_PREFIX: &str = "Landscape";

/// Material used for solid landscape meshes.
pub const LAND_MATERIAL: &str = "Landscape/Green";

/// Vertex colour for wireframe landscape meshes (RGBA).
pub const WIREFRAME_COLOUR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
