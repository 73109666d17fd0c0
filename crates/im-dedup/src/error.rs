//! Error types for label deduplication

use thiserror::Error;

/// Errors raised by the deduplication pipeline and its input/config layers.
///
/// Label content is never an error: any text, including the empty string,
/// is a valid label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "native", derive(uniffi::Error))]
#[cfg_attr(feature = "native", uniffi(flat_error))]
pub enum DedupError {
    #[error("Invalid threshold: {0} (must be between 0 and 100)")]
    InvalidThreshold(u32),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for deduplication operations
pub type DedupResult<T> = Result<T, DedupError>;

impl From<std::io::Error> for DedupError {
    fn from(err: std::io::Error) -> Self {
        DedupError::Io(err.to_string())
    }
}
