//! Common error types for GreenBite

use thiserror::Error;

/// Common result type for GreenBite operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across GreenBite services
///
/// Only batch-level failures live here. An ingredient that matches nothing, or a
/// reference value that is not a number, is recovered where it happens and never
/// becomes an `Error`.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed tabular data (wraps csv::Error)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Empty or malformed dish name / ingredient list
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Reference or recipe table missing, or lacking required columns
    #[error("Reference data unavailable: {0}")]
    ReferenceDataUnavailable(String),

    /// Dataset download failed
    #[error("Download error: {0}")]
    Download(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}
