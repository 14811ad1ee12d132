use std::io::{Read, Write};

use crate::codec::expect_magic;
use crate::error::PersistError;
use crate::format::DUSK_MAGIC;

/// Read the file header and return the declared record count.
///
/// A count above `max_records` is rejected before any record is read.
pub fn read_file_header(reader: &mut impl Read, max_records: u32) -> Result<u32, PersistError> {
    expect_magic(reader, DUSK_MAGIC, "file header")?;

    let mut buf = [0u8; 4];
    reader
        .read_exact(&mut buf)
        .map_err(|e| PersistError::from_read(e, "file header"))?;
    let declared = u32::from_le_bytes(buf);

    if declared > max_records {
        return Err(PersistError::TooManyRecords {
            declared,
            max: max_records,
        });
    }
    log::debug!("landscape file header declares {declared} record(s)");
    Ok(declared)
}

/// Write the file header for `count` records.
pub fn write_file_header(writer: &mut impl Write, count: u32) -> Result<(), PersistError> {
    writer.write_all(&DUSK_MAGIC)?;
    writer.write_all(&count.to_le_bytes())?;
    Ok(())
}
