/// Errors that can occur while reading or writing landscape data.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("invalid magic bytes (expected {expected:?}, found {found:?})")]
    InvalidMagic { expected: String, found: String },

    #[error("invalid stride {0} (must be positive)")]
    InvalidStride(f32),

    #[error("file declares {declared} records, maximum is {max}")]
    TooManyRecords { declared: u32, max: u32 },

    #[error("unexpected end of data in {section}")]
    Truncated { section: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PersistError {
    pub(crate) fn invalid_magic(expected: [u8; 4], found: [u8; 4]) -> Self {
        PersistError::InvalidMagic {
            expected: expected.escape_ascii().to_string(),
            found: found.escape_ascii().to_string(),
        }
    }

    /// Map a failed `read_exact` to `Truncated` on EOF, `Io` otherwise.
    pub(crate) fn from_read(err: std::io::Error, section: &'static str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            PersistError::Truncated { section }
        } else {
            PersistError::Io(err)
        }
    }
}
