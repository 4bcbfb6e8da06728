//! Assembly results.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fragment::ContextFragment;

/// Warning added when a selection produced no fragments.
pub const NO_FILES_WARNING: &str = "No files were found to include in the context.";

/// Fragments selected by one assembly, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    /// Selected fragments. A file reached twice appears twice.
    pub fragments: Vec<ContextFragment>,

    /// Skipped paths and forced includes worth telling the user about.
    pub warnings: Vec<String>,
}

impl Assembly {
    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// The finished context document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextOutput {
    /// Rendered document.
    pub document: String,

    /// Estimated token count of `document`.
    pub token_count: usize,

    /// Number of fragments in `document`.
    pub fragment_count: usize,

    /// Threshold the token count is compared against.
    pub token_warning_threshold: usize,

    /// Warnings raised while assembling.
    pub warnings: Vec<String>,
}

impl ContextOutput {
    /// Whether the token count is above the warning threshold.
    pub fn exceeds_threshold(&self) -> bool {
        self.token_count > self.token_warning_threshold
    }

    /// One-line token report.
    pub fn summary(&self) -> String {
        if self.exceeds_threshold() {
            format!(
                "The generated context is approximately {} tokens, which is greater than {} tokens.",
                self.token_count, self.token_warning_threshold
            )
        } else {
            format!(
                "The generated context is approximately {} tokens.",
                self.token_count
            )
        }
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
