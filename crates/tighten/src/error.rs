//! Error types for the tighten library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tighten operations.
///
/// Only startup-tier failures live here. Missing or failed evidence for a
/// single coordinate is never an error; it resolves to a `NoAction` decision.
#[derive(Debug, Error)]
pub enum TightenError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid or internally contradictory policy configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed profiling evidence (bad counts, blank identities).
    #[error("Evidence error: {0}")]
    Evidence(String),

    /// Malformed schema model.
    #[error("Model error: {0}")]
    Model(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for tighten operations.
pub type Result<T> = std::result::Result<T, TightenError>;
