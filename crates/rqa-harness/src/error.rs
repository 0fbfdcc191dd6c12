//! Error types for rqa-harness

use thiserror::Error;

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a run
#[derive(Debug, Error)]
pub enum Error {
    /// Fixture enumeration or loading failed
    #[error(transparent)]
    Fixture(#[from] rqa_fixtures::Error),

    /// Result persistence failed
    #[error("Report error for {case}: {detail}")]
    Report {
        /// Label of the case whose result could not be persisted
        case: String,
        /// Underlying failure
        detail: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
