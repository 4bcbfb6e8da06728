//! A directory scope holding the compiled patterns of its ignore files.

use std::fmt;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::warn;

use crate::error::{PatternError, Result};
use crate::rule::PatternRule;

/// Patterns interpreted relative to one directory of the workspace.
#[derive(Clone)]
pub struct PatternScope {
    /// Directory relative to the workspace root (empty for the root).
    directory: PathBuf,

    /// Rules in file order.
    rules: Vec<PatternRule>,

    /// Compiled gitignore matcher.
    matcher: Gitignore,
}

impl PatternScope {
    /// Compile `rules` into a scope for `directory` (relative to `workspace_root`).
    ///
    /// A rule the glob engine rejects is retried as a literal; if that fails
    /// too it is dropped with a warning.
    pub fn compile(
        workspace_root: &Path,
        directory: impl Into<PathBuf>,
        rules: Vec<PatternRule>,
    ) -> Result<Self> {
        let directory = directory.into();
        let mut builder = GitignoreBuilder::new(workspace_root.join(&directory));

        for rule in &rules {
            if let Err(err) = builder.add_line(None, &rule.to_line()) {
                warn!(
                    "Malformed pattern {:?} in {}, matching it literally: {err}",
                    rule.glob,
                    display_scope(&directory)
                );
                if let Err(err) = builder.add_line(None, &rule.to_literal_line()) {
                    warn!("Dropping pattern {:?}: {err}", rule.glob);
                }
            }
        }

        let matcher = builder.build().map_err(|source| PatternError::Matcher {
            scope: display_scope(&directory),
            source,
        })?;

        Ok(Self {
            directory,
            rules,
            matcher,
        })
    }

    /// Directory this scope governs, relative to the workspace root.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Rules in the order they were read.
    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Check a path given relative to this scope's directory.
    ///
    /// A path is matched when it, or any of its parent directories, is
    /// ignored by the last rule that applies to it. Negated rules
    /// re-include what earlier rules of this scope excluded.
    pub fn matches(&self, relative: &Path, is_dir: bool) -> bool {
        if self.rules.is_empty() || relative.as_os_str().is_empty() {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(relative, is_dir)
            .is_ignore()
    }
}

impl fmt::Debug for PatternScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternScope")
            .field("directory", &self.directory)
            .field("rules", &self.rules)
            .finish()
    }
}

fn display_scope(directory: &Path) -> String {
    if directory.as_os_str().is_empty() {
        "<root>".to_string()
    } else {
        directory.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::parse_patterns;

    fn scope(content: &str) -> PatternScope {
        PatternScope::compile(Path::new("/workspace"), "", parse_patterns(content)).unwrap()
    }

    #[test]
    fn test_directory_pattern_covers_children() {
        let scope = scope("node_modules/\n");

        assert!(scope.matches(Path::new("node_modules"), true));
        assert!(scope.matches(Path::new("node_modules/react/index.js"), false));
        assert!(scope.matches(Path::new("packages/app/node_modules"), true));
        assert!(!scope.matches(Path::new("node_modules"), false));
    }

    #[test]
    fn test_negation_reincludes() {
        let scope = scope("*.log\n!keep.log\n");

        assert!(scope.matches(Path::new("debug.log"), false));
        assert!(scope.matches(Path::new("logs/trace.log"), false));
        assert!(!scope.matches(Path::new("keep.log"), false));
    }

    #[test]
    fn test_anchored_pattern_only_matches_at_scope_root() {
        let scope = scope("/build\n");

        assert!(scope.matches(Path::new("build"), true));
        assert!(scope.matches(Path::new("build/out.js"), false));
        assert!(!scope.matches(Path::new("src/build"), true));
    }

    #[test]
    fn test_malformed_pattern_is_literal() {
        let scope = scope("[abc\n");

        assert!(scope.matches(Path::new("[abc"), false));
        assert!(!scope.matches(Path::new("a"), false));
    }

    #[test]
    fn test_empty_scope_matches_nothing() {
        let scope = scope("# only a comment\n");
        assert!(!scope.matches(Path::new("anything.txt"), false));
    }
}
