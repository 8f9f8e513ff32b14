//! Error types for index building, loading and lookups.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using GeoTrieError.
pub type Result<T> = std::result::Result<T, GeoTrieError>;

/// Errors that can occur while building, loading or querying an index.
#[derive(Debug, Error)]
pub enum GeoTrieError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("I/O error on {path}: {source}")]
    IoAt {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // Load errors
    #[error("index file too small: {size} bytes")]
    FileTooSmall { size: u64 },

    #[error("bad magic number: {found:#010x}")]
    BadMagic { found: u32 },

    #[error("unsupported index version: {found}")]
    UnsupportedVersion { found: u32 },

    // Traversal errors
    #[error("corrupt index: read of {len} bytes at offset {offset} exceeds size {size}")]
    CorruptIndex { offset: u64, len: usize, size: usize },

    #[error("malformed index at offset {offset}: {reason}")]
    Malformed { offset: u64, reason: String },

    // Input errors
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GeoTrieError {
    /// Attach a path to an I/O error.
    pub fn io_at(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GeoTrieError::IoAt {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from a damaged or foreign index file.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            GeoTrieError::FileTooSmall { .. }
                | GeoTrieError::BadMagic { .. }
                | GeoTrieError::UnsupportedVersion { .. }
                | GeoTrieError::CorruptIndex { .. }
                | GeoTrieError::Malformed { .. }
        )
    }
}
