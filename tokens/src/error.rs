//! Error types for tokenizers.

use thiserror::Error;

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;

/// Errors a primary tokenizer can report. The estimator never surfaces
/// these; it falls back to the heuristic instead.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// The encoding could not be loaded.
    #[error("tokenizer {name} unavailable: {reason}")]
    Unavailable {
        /// Tokenizer name.
        name: String,
        /// Why loading failed.
        reason: String,
    },

    /// Encoding the text failed.
    #[error("failed to encode text: {0}")]
    Encode(String),
}
