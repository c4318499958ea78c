//! Watcher error types.

use thiserror::Error;

/// Errors that can occur while setting up filesystem observation.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The underlying filesystem watcher failed.
    #[error("filesystem watcher: {0}")]
    Notify(#[from] notify::Error),
    /// An ignore pattern could not be compiled.
    #[error("ignore pattern: {0}")]
    Glob(#[from] globset::Error),
}

/// Result type for watcher operations.
pub type Result<T> = std::result::Result<T, WatchError>;
