use thiserror::Error;

/// Errors from the model artifact format, the artifact store and the
/// serving handle.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    #[error("deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),

    #[error("pointer encoding error: {0}")]
    Pointer(#[from] serde_json::Error),

    #[error("decompression error")]
    Decompression,

    #[error("corrupted artifact")]
    Corrupted,

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("format version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("artifact version {version} already exists")]
    VersionExists { version: u32 },

    #[error("no serving model published under {path}")]
    NoServingModel { path: String },

    #[error("no classifier loaded")]
    Unavailable,
}

/// Errors from the feedback object/metadata stores. One failed record
/// never affects any other record.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("metadata encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("object not found: {key}")]
    MissingObject { key: String },

    #[error("corrupted metadata row at line {line}")]
    CorruptedRow { line: usize },
}

/// Errors that abort a retraining run. Per-sample extraction failures are
/// not errors: they are skipped and logged.
#[derive(Error, Debug)]
pub enum TrainError {
    #[error("need at least two distinct labels to fit a classifier, found {found}")]
    InsufficientClasses { found: usize },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
