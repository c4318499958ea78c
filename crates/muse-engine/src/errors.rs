//! Engine error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the decision engine.
///
/// Only state persistence performs I/O; everything else in this crate is
/// infallible once the rule table is compiled.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Failed to read or write the persisted decision state.
    #[error("state file {path}: {source}")]
    StateIo {
        /// Path of the state file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The persisted decision state could not be parsed.
    #[error("state file {path}: {source}")]
    StateFormat {
        /// Path of the state file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
