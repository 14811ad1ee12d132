use std::io::Cursor;

use crate::codec::read_land_block;
use crate::error::PersistError;
use crate::header::read_file_header;

/// Per-record facts gathered without building landscape records.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSummary {
    pub offset_x: f32,
    pub offset_y: f32,
    pub stride: f32,
    pub lowest: f32,
    pub highest: f32,
}

/// Summary of a landscape file buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    pub records: Vec<RecordSummary>,
    /// Bytes left after the last declared record.
    pub trailing_bytes: usize,
}

impl FileSummary {
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

/// Walk a complete landscape file held in memory.
pub fn scan_file(bytes: &[u8], max_records: u32) -> Result<FileSummary, PersistError> {
    let mut cursor = Cursor::new(bytes);
    let declared = read_file_header(&mut cursor, max_records)?;

    let mut records = Vec::with_capacity(declared as usize);
    for _ in 0..declared {
        let block = read_land_block(&mut cursor)?;
        let (lowest, highest) = block.grid.min_max();
        records.push(RecordSummary {
            offset_x: block.offset_x,
            offset_y: block.offset_y,
            stride: block.stride,
            lowest,
            highest,
        });
    }

    let consumed = cursor.position() as usize;
    Ok(FileSummary {
        records,
        trailing_bytes: bytes.len() - consumed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::write_land_block;
    use crate::format::{LandBlock, FILE_HEADER_SIZE, LAND_RECORD_SIZE};
    use crate::header::write_file_header;
    use dusk_core::HeightGrid;

    fn plain_block(offset_x: f32, height: f32) -> LandBlock {
        let mut grid = HeightGrid::new();
        grid.fill_heights(height);
        LandBlock {
            offset_x,
            offset_y: 0.0,
            stride: 5.0,
            grid,
        }
    }

    #[test]
    fn test_scan_reports_each_record() {
        let mut bytes = Vec::new();
        write_file_header(&mut bytes, 2).expect("header");
        write_land_block(&mut bytes, &plain_block(0.0, 1.0)).expect("block");
        let mut hilly = plain_block(325.0, 2.0);
        hilly.grid.set_height(30, 30, 12.0);
        write_land_block(&mut bytes, &hilly).expect("block");
        assert_eq!(bytes.len(), FILE_HEADER_SIZE + 2 * LAND_RECORD_SIZE);

        let summary = scan_file(&bytes, 2500).expect("scan should succeed");
        assert_eq!(summary.record_count(), 2);
        assert_eq!(summary.trailing_bytes, 0);
        assert_eq!(summary.records[0].lowest, 1.0);
        assert_eq!(summary.records[0].highest, 1.0);
        assert_eq!(summary.records[1].offset_x, 325.0);
        assert_eq!(summary.records[1].lowest, 2.0);
        assert_eq!(summary.records[1].highest, 12.0);
    }

    #[test]
    fn test_scan_counts_trailing_bytes() {
        let mut bytes = Vec::new();
        write_file_header(&mut bytes, 1).expect("header");
        write_land_block(&mut bytes, &plain_block(0.0, 0.0)).expect("block");
        bytes.extend_from_slice(&[0xAA; 7]);
        let summary = scan_file(&bytes, 2500).expect("scan should succeed");
        assert_eq!(summary.trailing_bytes, 7);
    }

    #[test]
    fn test_scan_fails_on_missing_record() {
        let mut bytes = Vec::new();
        write_file_header(&mut bytes, 2).expect("header");
        write_land_block(&mut bytes, &plain_block(0.0, 0.0)).expect("block");
        let result = scan_file(&bytes, 2500);
        assert!(matches!(result, Err(PersistError::Truncated { .. })));
    }
}
