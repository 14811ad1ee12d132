use dusk_core::RecordId;
use dusk_persist::PersistError;

/// Errors reported by landscape records and the record table.
#[derive(Debug, thiserror::Error)]
pub enum LandscapeError {
    #[error("record {0} already contains data")]
    AlreadyLoaded(RecordId),

    #[error("record {0} has no valid data (yet)")]
    NotLoaded(RecordId),

    #[error("scaling factor {factor} is invalid (minimum {min})")]
    ScaleTooSmall { factor: f32, min: f32 },

    #[error("position ({x}, {z}) lies outside record {id}")]
    OutOfBounds { id: RecordId, x: f32, z: f32 },

    #[error("no landscape record covers position ({x}, {z})")]
    NoRecordAt { x: f32, z: f32 },

    #[error("scene node {0:?} does not exist")]
    MissingLandNode(String),

    #[error("scene refused to attach mesh {0:?}")]
    AttachFailed(String),

    #[error("landscape data is already present ({0} records)")]
    RecordsPresent(usize),

    #[error("no landscape data is present")]
    NoRecords,

    #[error("no landscape record with id {0}")]
    UnknownRecord(RecordId),

    #[error("could not open {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Persist(#[from] PersistError),
}
