//! Selection requests.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which files an assembly includes. Exactly one mode per call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRequest {
    /// Every admitted file under the workspace root.
    #[default]
    WholeTree,

    /// One file plus the files it imports.
    OpenFile(PathBuf),

    /// A caller-chosen set of files.
    ExplicitFiles(Vec<PathBuf>),
}

impl SelectionRequest {
    /// Request for an explicit file set.
    pub fn files<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::ExplicitFiles(paths.into_iter().map(Into::into).collect())
    }

    /// Short name of the mode, for logging.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::WholeTree => "whole tree",
            Self::OpenFile(_) => "open file",
            Self::ExplicitFiles(_) => "explicit files",
        }
    }
}
