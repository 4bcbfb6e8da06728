//! Resolution of import specifiers to workspace files.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use ctxgen_patterns::{PatternStore, extension_of, relative_to};
use path_absolutize::Absolutize;
use tracing::debug;

/// An import that maps to a file in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImport {
    /// Full path to the imported file.
    pub absolute_path: PathBuf,

    /// Path relative to the workspace root, `/`-separated.
    pub relative_path: String,

    /// Lowercase extension without the dot.
    pub extension: String,
}

/// Maps raw specifiers to files, trying candidate extensions in order.
#[derive(Debug, Clone)]
pub struct ImportResolver {
    workspace_root: PathBuf,
    extensions: Vec<String>,
}

impl ImportResolver {
    /// Create a resolver. `extensions` is the priority order tried for
    /// extension-less specifiers and the set of recognised extensions.
    pub fn new<I, S>(workspace_root: impl Into<PathBuf>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            workspace_root: workspace_root.into(),
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// Candidate extensions in priority order.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Resolve `specifier` as written in `source_file`.
    ///
    /// Package imports, paths outside the workspace, missing files and
    /// files excluded by `store` all resolve to `None`.
    pub fn resolve(
        &self,
        source_file: &Path,
        specifier: &str,
        store: &PatternStore,
    ) -> Option<ResolvedImport> {
        if !is_path_specifier(specifier) {
            debug!("Skipping package import {specifier:?}");
            return None;
        }

        let base_dir = source_file.parent()?;
        let joined = base_dir.join(specifier.trim_start_matches('/'));
        let target = match joined.absolutize() {
            Ok(target) => target.into_owned(),
            Err(e) => {
                debug!("Cannot normalize import {specifier:?}: {e}");
                return None;
            }
        };

        let extension = extension_of(&target);
        let found = if self.is_recognized(&extension) {
            target.is_file().then_some(target)
        } else {
            self.with_candidate_extension(&target)
        }?;

        let relative_path = relative_to(&self.workspace_root, &found)?;
        if store.is_excluded(&relative_path, false) {
            debug!("Import {relative_path} is ignored by patterns");
            return None;
        }

        Some(ResolvedImport {
            extension: extension_of(&found),
            absolute_path: found,
            relative_path,
        })
    }

    fn is_recognized(&self, extension: &str) -> bool {
        !extension.is_empty() && self.extensions.iter().any(|e| e == extension)
    }

    /// First `target.<ext>` that exists, in priority order.
    fn with_candidate_extension(&self, target: &Path) -> Option<PathBuf> {
        self.extensions.iter().find_map(|ext| {
            let mut name = OsString::from(target.as_os_str());
            name.push(".");
            name.push(ext);
            let candidate = PathBuf::from(name);
            candidate.is_file().then_some(candidate)
        })
    }
}

/// Relative (`./`, `../`) or rooted specifiers point into the tree; anything
/// else is a package import.
fn is_path_specifier(specifier: &str) -> bool {
    specifier.starts_with('.') || specifier.starts_with('/')
}
