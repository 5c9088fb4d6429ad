//! Error types for stream-etl

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, EtlError>;

/// Failures raised by the pipeline stages.
///
/// A missing blocklist is deliberately absent from this list: it loads as an
/// empty set instead of failing.
#[derive(Debug, Error)]
pub enum EtlError {
    /// The input file does not exist
    #[error("File {} not found", path.display())]
    NotFound { path: PathBuf },

    /// Any other failure while reading the input
    #[error("Error ingesting data from {}: {source}", path.display())]
    Ingest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Column count of a data line does not match the header (strict policy only)
    #[error("Malformed row at line {line}: expected {expected} fields, found {found}")]
    Malformed {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// The filter could not decide on a row
    #[error("Error filtering row at line {line}: {reason}")]
    Filter { line: usize, reason: String },

    /// The blocklist exists but could not be read
    #[error("Error loading blocklist {}: {source}", path.display())]
    Blocklist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Destination I/O failure
    #[error("Error writing to {target}: {source}")]
    Write {
        target: String,
        #[source]
        source: io::Error,
    },

    /// Write attempted outside the destination's open/close scope
    #[error("Destination {target} is not open")]
    NotOpen { target: String },

    /// Sampling stride must select at least every row
    #[error("Stride must be at least 1")]
    InvalidStride,
}

impl EtlError {
    /// Check if this error is the "input file not found" condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, EtlError::NotFound { .. })
    }

    pub(crate) fn write(target: impl Into<String>, source: io::Error) -> Self {
        EtlError::Write {
            target: target.into(),
            source,
        }
    }
}
