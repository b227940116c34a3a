//! Error types for the analysis pipeline
//!
//! Every stage propagates through this one taxonomy; the only catch point is
//! [`crate::pipeline::run`], which folds errors into a tagged outcome instead
//! of letting them escape the process.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline error types
#[derive(Error, Debug)]
pub enum Error {
    /// Dataset could not be materialized or parsed
    #[error("dataset error: {0}")]
    DataSource(String),

    /// Structural invariant of the table violated
    #[error("validation failed: {0}")]
    Validation(String),

    /// Chart construction or drawing failed
    #[error("render error: {0}")]
    Render(String),

    /// Persistence refused by the operating system
    #[error("permission denied writing {}: {source}", path.display())]
    PermissionDenied {
        /// Destination that could not be written
        path: PathBuf,
        /// Underlying OS error
        source: std::io::Error,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl Error {
    /// Short stable name of the error kind, used in outcome reports and log
    /// fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DataSource(_) => "data-source",
            Self::Validation(_) => "validation",
            Self::Render(_) => "render",
            Self::PermissionDenied { .. } => "permission-denied",
            Self::Io(_) => "io",
            Self::Arrow(_) => "arrow",
        }
    }
}
