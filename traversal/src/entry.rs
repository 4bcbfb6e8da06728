//! File entries produced by a traversal.

use std::path::{Path, PathBuf};

use ctxgen_patterns::{extension_of, relative_to};
use serde::{Deserialize, Serialize};

/// A file or directory found under the workspace root.
///
/// Content is not read here; callers read it on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Full path to the entry.
    pub absolute_path: PathBuf,

    /// Path relative to the workspace root, `/`-separated.
    pub relative_path: String,

    /// Lowercase extension without the dot (empty if none).
    pub extension: String,

    /// Whether the entry is a directory.
    pub is_directory: bool,
}

impl FileEntry {
    /// Create an entry for `path` under `workspace_root`.
    ///
    /// Returns `None` when `path` is outside the workspace.
    pub fn new(workspace_root: &Path, path: impl Into<PathBuf>, is_directory: bool) -> Option<Self> {
        let absolute_path = path.into();
        let relative_path = relative_to(workspace_root, &absolute_path)?;
        let extension = if is_directory {
            String::new()
        } else {
            extension_of(&absolute_path)
        };

        Some(Self {
            absolute_path,
            relative_path,
            extension,
            is_directory,
        })
    }

    /// File name component.
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_entry_creation() {
        let entry = FileEntry::new(Path::new("/ws"), "/ws/src/App.TSX", false).unwrap();
        assert_eq!(entry.relative_path, "src/App.TSX");
        assert_eq!(entry.extension, "tsx");
        assert_eq!(entry.file_name(), "App.TSX");
        assert!(!entry.is_directory);
    }

    #[test]
    fn test_directory_has_no_extension() {
        let entry = FileEntry::new(Path::new("/ws"), "/ws/lib.d", true).unwrap();
        assert_eq!(entry.extension, "");
        assert!(entry.is_directory);
    }

    #[test]
    fn test_outside_workspace() {
        assert_eq!(FileEntry::new(Path::new("/ws"), "/elsewhere/a.ts", false), None);
    }
}
