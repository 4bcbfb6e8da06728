//! Error types for directory traversal.

use thiserror::Error;

/// Result type alias for traversal operations.
pub type Result<T> = std::result::Result<T, TraversalError>;

/// Errors that abort a traversal.
///
/// Unreadable directories are not errors; they become warnings and their
/// subtree is left out.
#[derive(Error, Debug)]
pub enum TraversalError {
    /// The scan was cancelled between directories.
    #[error("traversal cancelled")]
    Cancelled,

    /// Start directory not found.
    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    /// Start directory lies outside the workspace.
    #[error("directory outside workspace: {0}")]
    OutsideWorkspace(String),
}
