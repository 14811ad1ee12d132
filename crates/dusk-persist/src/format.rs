use dusk_core::constants::GRID_POINTS;
use dusk_core::HeightGrid;

/// Magic bytes opening a landscape file.
pub const DUSK_MAGIC: [u8; 4] = *b"Dusk";

/// Magic bytes opening each landscape record.
pub const LAND_MAGIC: [u8; 4] = *b"Land";

/// File header: magic (4) + record count (4).
pub const FILE_HEADER_SIZE: usize = 8;

/// Record header: magic (4) + offset_x (4) + offset_y (4) + stride (4).
pub const RECORD_HEADER_SIZE: usize = 16;

/// Height payload: 65 * 65 little-endian f32.
pub const HEIGHT_BYTES: usize = GRID_POINTS * 4;

/// Colour payload: 65 * 65 RGB byte triplets.
pub const COLOUR_BYTES: usize = GRID_POINTS * 3;

/// Serialized size of one record.
pub const LAND_RECORD_SIZE: usize = RECORD_HEADER_SIZE + HEIGHT_BYTES + COLOUR_BYTES;

/// One record as it appears on disk.
///
/// Layout, no padding, no compression:
/// `"Land"`, offset_x, offset_y, stride, heights (row-major), colours (row-major).
#[derive(Debug, Clone, PartialEq)]
pub struct LandBlock {
    pub offset_x: f32,
    pub offset_y: f32,
    pub stride: f32,
    pub grid: HeightGrid,
}
