//! Error types for import extraction.

use thiserror::Error;

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Errors that can occur when setting up import extraction.
///
/// Resolution itself never fails: an import that cannot be resolved is
/// simply dropped.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The extraction pattern does not compile.
    #[error("invalid import pattern: {0}")]
    InvalidPattern(#[from] regex_lite::Error),

    /// The extraction pattern has no capture group for the specifier.
    #[error("import pattern has no capture group: {0}")]
    MissingCapture(String),
}
