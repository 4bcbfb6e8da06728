//! The pattern store: every ignore scope of a workspace.

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::PatternStoreConfig;
use crate::error::{PatternError, Result};
use crate::paths::{VCS_DIR, normalize_relative};
use crate::rule::{PatternRule, parse_patterns};
use crate::scope::PatternScope;

/// Read-only set of ignore scopes for one workspace.
///
/// Built once, consulted many times. When an ignore file changes the owner
/// calls [`PatternStore::rebuild`]; scopes are never patched in place.
#[derive(Debug, Clone)]
pub struct PatternStore {
    /// Workspace root the scopes are relative to.
    root: PathBuf,

    /// Configuration the store was built from.
    config: PatternStoreConfig,

    /// Synthetic scope excluding the ignore files themselves.
    root_scope: PatternScope,

    /// Scopes keyed by directory relative to the root.
    scopes: BTreeMap<PathBuf, PatternScope>,
}

impl PatternStore {
    /// Build the store for `root`, loading every ignore file in the tree.
    pub fn build(root: impl Into<PathBuf>, config: &PatternStoreConfig) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(PatternError::WorkspaceNotFound(root.display().to_string()));
        }

        let root_rules = config
            .ignore_file_names
            .iter()
            .map(|name| PatternRule::literal(name))
            .collect();
        let root_scope = PatternScope::compile(&root, "", root_rules)?;

        let mut store = Self {
            root,
            config: config.clone(),
            root_scope,
            scopes: BTreeMap::new(),
        };
        store.load_scopes()?;

        info!(
            "Loaded {} ignore scope(s) under {}",
            store.scopes.len(),
            store.root.display()
        );
        Ok(store)
    }

    /// A store that excludes nothing.
    pub fn empty(root: impl Into<PathBuf>) -> Result<Self> {
        Self::build(root, &PatternStoreConfig::default())
    }

    /// Discard every scope and load the ignore files again.
    pub fn rebuild(&mut self) -> Result<()> {
        *self = Self::build(self.root.clone(), &self.config)?;
        Ok(())
    }

    /// Workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Configuration the store was built from.
    pub fn config(&self) -> &PatternStoreConfig {
        &self.config
    }

    /// Directory scopes, shallow first.
    pub fn scopes(&self) -> impl Iterator<Item = &PatternScope> {
        self.scopes.values()
    }

    /// Check whether a workspace-relative path is excluded.
    ///
    /// The root scope is consulted first, then the scope of every ancestor
    /// directory from the root down, each against the path made relative to
    /// its own directory. The first scope that matches wins. Empty paths and
    /// `.` are never excluded.
    pub fn is_excluded(&self, relative: impl AsRef<Path>, is_dir: bool) -> bool {
        let Some(relative) = normalize_relative(relative.as_ref()) else {
            return false;
        };

        if self.root_scope.matches(&relative, is_dir) {
            debug!("{} is an ignore file", relative.display());
            return true;
        }

        let mut directory = PathBuf::new();
        if self.scope_matches(&directory, &relative, is_dir) {
            return true;
        }

        let mut components = relative.components().peekable();
        while let Some(component) = components.next() {
            if components.peek().is_none() {
                break;
            }
            directory.push(component);
            if self.scope_matches(&directory, &relative, is_dir) {
                return true;
            }
        }

        false
    }

    fn scope_matches(&self, directory: &Path, relative: &Path, is_dir: bool) -> bool {
        let Some(scope) = self.scopes.get(directory) else {
            return false;
        };
        let Ok(within) = relative.strip_prefix(directory) else {
            return false;
        };
        let matched = scope.matches(within, is_dir);
        if matched {
            debug!(
                "{} excluded by scope {:?}",
                relative.display(),
                directory.display()
            );
        }
        matched
    }

    /// Register one scope per directory holding ignore files, shallow first.
    ///
    /// Directories are searched breadth first and a directory's own scope is
    /// loaded before its children are considered, so excluded directories are
    /// never entered. Symbolic links are not followed.
    fn load_scopes(&mut self) -> Result<()> {
        if self.config.ignore_file_names.is_empty() {
            return Ok(());
        }
        let max_depth = self.config.max_depth.unwrap_or(usize::MAX);

        let mut pending = VecDeque::from([(PathBuf::new(), 0usize)]);
        while let Some((directory, depth)) = pending.pop_front() {
            if depth >= max_depth {
                continue;
            }

            let (files, children) = self.list_directory(&directory);
            self.load_scope(&directory, files)?;

            for child in children {
                if self.is_excluded(&child, true) {
                    debug!("Not searching excluded directory {}", child.display());
                    continue;
                }
                pending.push_back((child, depth + 1));
            }
        }

        Ok(())
    }

    /// Compile the ignore files of one directory into its scope.
    fn load_scope(&mut self, directory: &Path, files: Vec<PathBuf>) -> Result<()> {
        let mut rules = Vec::new();
        for file in files {
            match fs::read_to_string(&file) {
                Ok(content) => {
                    let parsed = parse_patterns(&content);
                    debug!("Read {} pattern(s) from {}", parsed.len(), file.display());
                    rules.extend(parsed);
                }
                Err(e) => warn!("Failed to read ignore file {}: {e}", file.display()),
            }
        }

        if rules.is_empty() {
            return Ok(());
        }

        let scope = PatternScope::compile(&self.root, directory, rules)?;
        self.scopes.insert(directory.to_path_buf(), scope);
        Ok(())
    }

    /// Ignore files of `directory` in configured priority order, and its
    /// subdirectories (relative to the root) other than the VCS directory.
    fn list_directory(&self, directory: &Path) -> (Vec<PathBuf>, Vec<PathBuf>) {
        let walker = WalkDir::new(self.root.join(directory))
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        let mut files = Vec::new();
        let mut children = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Error searching for ignore files: {e}");
                    continue;
                }
            };
            let name = entry.file_name();
            if entry.file_type().is_dir() {
                if name != VCS_DIR {
                    children.push(directory.join(name));
                }
                continue;
            }
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(priority) = name.to_str().and_then(|n| self.config.priority_of(n)) {
                files.push((priority, entry.into_path()));
            }
        }

        files.sort_by_key(|(priority, _)| *priority);
        (files.into_iter().map(|(_, file)| file).collect(), children)
    }
}
