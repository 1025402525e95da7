//! Error types for the merge engine and its hosts.

use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the library.
///
/// Malformed lines and empty inputs are deliberately absent: they are
/// tolerated, not reported.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Request body is not a list of `{ name, content }` sources.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Session record is corrupt: {0}")]
    Session(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl MergeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MergeError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MergeError>;
