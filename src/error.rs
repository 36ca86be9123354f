//! Error types for histkeep.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for histkeep operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in histkeep operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A history document could not be read: missing, unreadable or malformed.
    ///
    /// Malformed JSON surfaces as an `io::Error` of kind `InvalidData`.
    #[error("Failed to read history from {}: {source}", path.display())]
    IoRead {
        /// Document that was being read.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },

    /// A history document could not be written.
    #[error("Failed to write history to {}: {source}", path.display())]
    IoWrite {
        /// Document that was being written.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },

    /// Storage I/O error outside a single document (directories, listings).
    #[error("Storage error: {0}")]
    Storage(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Invalid state encountered.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Session not found.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Session id cannot be used as a file name.
    #[error("Invalid session id: {0:?}")]
    InvalidSessionId(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this is a read failure of a history document.
    #[must_use]
    pub fn is_read_error(&self) -> bool {
        matches!(self, Self::IoRead { .. })
    }

    /// Whether this is a write failure of a history document.
    #[must_use]
    pub fn is_write_error(&self) -> bool {
        matches!(self, Self::IoWrite { .. })
    }
}
