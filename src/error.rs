//! Error types for report loading and parsing

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KoverError {
    #[error("Please specify file name.")]
    EmptyPath,

    #[error("No Kover xml report found at {}", path.display())]
    ReportNotFound { path: PathBuf },

    #[error("Failed to read report {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed coverage report: {0}")]
    MalformedReport(String),

    #[error("Coverage report has no project-level INSTRUCTION counter")]
    MissingCounter,

    #[error("Invalid counter value for '{attribute}': '{value}'")]
    InvalidCounterValue { attribute: String, value: String },
}

/// Result type for report operations
pub type Result<T> = std::result::Result<T, KoverError>;
