//! Error types for run storage.

use plume_core::FieldError;
use std::fmt;
use std::io;

use crate::store::Category;

/// Errors from reading or writing runs and dataset documents.
#[derive(Debug)]
pub enum StoreError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The file does not start with the expected `b"PLUM"` magic bytes.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the file.
        found: u8,
    },
    /// A stack could not be decoded (truncated or corrupt data).
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// The payload checksum does not match the stored one.
    ChecksumMismatch {
        /// Checksum stored in the file.
        stored: u64,
        /// Checksum of the payload as read.
        computed: u64,
    },
    /// The run has no data of the requested category.
    MissingRun {
        /// The requested run.
        run_id: String,
        /// The requested category.
        category: Category,
    },
    /// The dataset has no `info.json`.
    MissingInfo,
    /// A JSON document could not be read or written.
    Json(serde_json::Error),
    /// Decoded data does not form a valid stack.
    Field(FieldError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"PLUM\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::Malformed { detail } => write!(f, "malformed stack: {detail}"),
            Self::ChecksumMismatch { stored, computed } => write!(
                f,
                "payload checksum mismatch: stored={stored:#018x}, computed={computed:#018x}"
            ),
            Self::MissingRun { run_id, category } => {
                write!(f, "run '{run_id}' has no {category} data")
            }
            Self::MissingInfo => write!(f, "dataset has no info document"),
            Self::Json(e) => write!(f, "JSON: {e}"),
            Self::Field(e) => write!(f, "invalid stack: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Field(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<FieldError> for StoreError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}
