//! Error types for the extraction layer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while extracting a batch.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The API key environment variable is not set.
    #[error("missing API key: set {0}")]
    MissingApiKey(String),

    /// Transport-level failure talking to the backend.
    #[error("request failed: {0}")]
    Http(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend answer could not be read as a batch result.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// No recorded result exists for a batch.
    #[error("no fixture for batch {batch} at {path}")]
    MissingFixture { batch: usize, path: PathBuf },

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
