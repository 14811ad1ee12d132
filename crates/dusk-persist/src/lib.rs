pub mod codec;
pub mod error;
pub mod format;
pub mod header;
pub mod inspect;

pub use codec::{read_land_block, write_land_block};
pub use error::PersistError;
pub use format::LandBlock;
pub use header::{read_file_header, write_file_header};
pub use inspect::{scan_file, FileSummary, RecordSummary};
