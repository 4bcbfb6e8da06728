//! Error types for the pattern store.

use thiserror::Error;

/// Result type alias for pattern store operations.
pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors that can occur while building the pattern store.
///
/// Unreadable ignore files and malformed lines are not errors; they are
/// logged and skipped.
#[derive(Error, Debug)]
pub enum PatternError {
    /// Workspace root does not exist or is not a directory.
    #[error("workspace not found: {0}")]
    WorkspaceNotFound(String),

    /// A scope matcher could not be compiled.
    #[error("failed to compile patterns for scope {scope}: {source}")]
    Matcher {
        /// Scope directory, relative to the workspace root.
        scope: String,
        #[source]
        source: ignore::Error,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
