//! Inclusion policy for traversed files.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Which files a traversal admits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalPolicy {
    /// Lowercase extensions without the dot.
    pub detected_extensions: BTreeSet<String>,

    /// Whether files outside `detected_extensions` are skipped.
    pub enforce_extensions: bool,
}

impl TraversalPolicy {
    /// Create a policy that enforces the given extensions.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            detected_extensions: extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .filter(|ext| !ext.is_empty())
                .collect(),
            enforce_extensions: true,
        }
    }

    /// Admit every file regardless of extension.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Turn extension enforcement on or off.
    pub fn with_enforcement(mut self, enforce: bool) -> Self {
        self.enforce_extensions = enforce;
        self
    }

    /// Check whether a file with `extension` is admitted.
    pub fn admits(&self, extension: &str) -> bool {
        !self.enforce_extensions || self.detected_extensions.contains(extension)
    }
}

/// Lowercase an extension and strip a leading dot.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}
