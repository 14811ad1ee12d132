use std::io::{Read, Write};

use dusk_core::HeightGrid;

use crate::error::PersistError;
use crate::format::*;

fn read_f32(reader: &mut impl Read, section: &'static str) -> Result<f32, PersistError> {
    let mut buf = [0u8; 4];
    reader
        .read_exact(&mut buf)
        .map_err(|e| PersistError::from_read(e, section))?;
    Ok(f32::from_le_bytes(buf))
}

/// Read the 4-byte tag at the current position and compare it to `expected`.
pub(crate) fn expect_magic(
    reader: &mut impl Read,
    expected: [u8; 4],
    section: &'static str,
) -> Result<(), PersistError> {
    let mut found = [0u8; 4];
    reader
        .read_exact(&mut found)
        .map_err(|e| PersistError::from_read(e, section))?;
    if found != expected {
        return Err(PersistError::invalid_magic(expected, found));
    }
    Ok(())
}

/// Read one landscape record.
///
/// Checks happen in file order: tag, offsets and stride, stride sign, height
/// payload, colour payload. The first failing check aborts the read.
pub fn read_land_block(reader: &mut impl Read) -> Result<LandBlock, PersistError> {
    expect_magic(reader, LAND_MAGIC, "record header")?;

    let offset_x = read_f32(reader, "record header")?;
    let offset_y = read_f32(reader, "record header")?;
    let stride = read_f32(reader, "record header")?;
    if !(stride > 0.0) {
        return Err(PersistError::InvalidStride(stride));
    }

    let mut grid = HeightGrid::new();

    let mut height_bytes = vec![0u8; HEIGHT_BYTES];
    reader
        .read_exact(&mut height_bytes)
        .map_err(|e| PersistError::from_read(e, "height data"))?;
    for (h, bytes) in grid.heights_mut().iter_mut().zip(height_bytes.chunks_exact(4)) {
        *h = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }

    reader
        .read_exact(bytemuck::cast_slice_mut(grid.colours_mut()))
        .map_err(|e| PersistError::from_read(e, "colour data"))?;

    Ok(LandBlock {
        offset_x,
        offset_y,
        stride,
        grid,
    })
}

/// Write one landscape record in the fixed layout described on [`LandBlock`].
pub fn write_land_block(writer: &mut impl Write, block: &LandBlock) -> Result<(), PersistError> {
    let mut output = Vec::with_capacity(LAND_RECORD_SIZE);
    output.extend_from_slice(&LAND_MAGIC);
    output.extend_from_slice(&block.offset_x.to_le_bytes());
    output.extend_from_slice(&block.offset_y.to_le_bytes());
    output.extend_from_slice(&block.stride.to_le_bytes());
    for h in block.grid.heights() {
        output.extend_from_slice(&h.to_le_bytes());
    }
    output.extend_from_slice(bytemuck::cast_slice(block.grid.colours()));
    debug_assert_eq!(output.len(), LAND_RECORD_SIZE);

    writer.write_all(&output)?;
    Ok(())
}
