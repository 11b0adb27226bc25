//! Error types for retention operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for retention operations.
pub type Result<T> = std::result::Result<T, RetentionError>;

/// Errors that can occur during retention operations
#[derive(Error, Debug)]
pub enum RetentionError {
    /// The managed directory could not be enumerated
    #[error("Failed to scan directory {}: {source}", path.display())]
    DirectoryScan {
        /// Directory that failed to enumerate
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Max-age threshold outside the accepted range
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// I/O error outside of a sweep (producer writes, folder sizing)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Worker error (sweep task panicked or was aborted)
    #[error("Worker error: {0}")]
    Worker(String),
}
