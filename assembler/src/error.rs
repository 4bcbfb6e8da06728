//! Error types for context assembly.

use ctxgen_traversal::TraversalError;
use thiserror::Error;

/// Result type alias for assembler operations.
pub type Result<T> = std::result::Result<T, AssemblerError>;

/// Errors that stop an assembly before any output is produced.
///
/// Unreadable files and directories are not errors; they are skipped and
/// reported as warnings on the output.
#[derive(Error, Debug)]
pub enum AssemblerError {
    /// Workspace root does not exist or is not a directory.
    #[error("workspace not found: {0}")]
    WorkspaceNotFound(String),

    /// Selected file does not exist.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Selected path is a directory.
    #[error("not a file: {0}")]
    NotAFile(String),

    /// Selected path lies outside the workspace.
    #[error("file outside workspace: {0}")]
    OutsideWorkspace(String),

    /// An explicit selection named no files.
    #[error("no files selected")]
    NoFilesSelected,

    /// The assembly was cancelled.
    #[error("context generation cancelled")]
    Cancelled,

    /// Configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        /// Config file path.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML.
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Pattern store error.
    #[error("pattern error: {0}")]
    Patterns(#[from] ctxgen_patterns::PatternError),

    /// Traversal error.
    #[error("traversal error: {0}")]
    Traversal(TraversalError),

    /// Import extractor error.
    #[error("import error: {0}")]
    Imports(#[from] ctxgen_imports::ImportError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Background task failed.
    #[error("task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<TraversalError> for AssemblerError {
    fn from(error: TraversalError) -> Self {
        match error {
            TraversalError::Cancelled => Self::Cancelled,
            other => Self::Traversal(other),
        }
    }
}
