//! Configuration for building a pattern store.

use serde::{Deserialize, Serialize};

/// Which ignore files to honour and how far to search for them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternStoreConfig {
    /// Ignore-file names, in priority order. Empty means nothing is ignored.
    pub ignore_file_names: Vec<String>,

    /// Maximum depth searched for ignore files (None = unlimited).
    pub max_depth: Option<usize>,
}

impl PatternStoreConfig {
    /// Create a config honouring the given ignore-file names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignore_file_names: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Bound the ignore-file search depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Position of `name` in the configured list, if it is an ignore file.
    pub fn priority_of(&self, name: &str) -> Option<usize> {
        self.ignore_file_names.iter().position(|n| n == name)
    }
}
