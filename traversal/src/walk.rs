//! Sequential, lazy directory walk.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ctxgen_patterns::{PatternStore, VCS_DIR, relative_to};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::TraversalPolicy;
use crate::entry::FileEntry;
use crate::error::{Result, TraversalError};

/// A directory or entry that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalWarning {
    /// Path that failed.
    pub path: PathBuf,

    /// What went wrong.
    pub message: String,
}

impl TraversalWarning {
    pub(crate) fn io(path: &Path, error: &io::Error) -> Self {
        warn!("Error reading {}: {error}", path.display());
        Self {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }

    fn walk(error: &walkdir::Error, fallback: &Path) -> Self {
        let path = error.path().unwrap_or(fallback);
        match error.io_error() {
            Some(io_error) => Self::io(path, io_error),
            None => {
                warn!("Error walking {}: {error}", path.display());
                Self {
                    path: path.to_path_buf(),
                    message: error.to_string(),
                }
            }
        }
    }
}

impl fmt::Display for TraversalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Entries admitted by a traversal plus the warnings it raised.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    /// Admitted files in traversal order.
    pub entries: Vec<FileEntry>,

    /// Directories or entries that were skipped because of I/O errors.
    pub warnings: Vec<TraversalWarning>,
}

impl Collected {
    /// Append another result set after this one.
    pub fn merge(&mut self, other: Collected) {
        self.entries.extend(other.entries);
        self.warnings.extend(other.warnings);
    }
}

/// One raw directory listing entry.
#[derive(Debug)]
pub(crate) struct Listed {
    pub(crate) path: PathBuf,
    pub(crate) name: OsString,
    pub(crate) is_dir: bool,
}

impl Listed {
    /// Symbolic links to files are listed as files; links to directories
    /// and dangling links are dropped.
    fn from_walk(entry: walkdir::DirEntry) -> Option<Self> {
        let is_dir = if entry.path_is_symlink() {
            match fs::metadata(entry.path()) {
                Ok(target) if target.is_file() => false,
                Ok(_) => {
                    debug!("Not following symlinked directory {}", entry.path().display());
                    return None;
                }
                Err(e) => {
                    debug!("Skipping dangling symlink {}: {e}", entry.path().display());
                    return None;
                }
            }
        } else {
            entry.file_type().is_dir()
        };

        Some(Self {
            name: entry.file_name().to_os_string(),
            path: entry.into_path(),
            is_dir,
        })
    }
}

/// What to do with a listed entry.
pub(crate) enum Decision {
    Skip,
    Descend(PathBuf),
    Admit(FileEntry),
}

/// Inclusion rules shared by the sequential and parallel walks.
pub(crate) struct Scanner {
    store: Arc<PatternStore>,
    policy: TraversalPolicy,
}

impl Scanner {
    pub(crate) fn new(store: Arc<PatternStore>, policy: TraversalPolicy) -> Self {
        Self { store, policy }
    }

    /// Validate the start directory; `Ok(false)` when it is itself excluded.
    pub(crate) fn check_start(&self, start: &Path) -> Result<bool> {
        if !start.is_dir() {
            return Err(TraversalError::DirectoryNotFound(start.display().to_string()));
        }
        let Some(relative) = relative_to(self.store.root(), start) else {
            return Err(TraversalError::OutsideWorkspace(start.display().to_string()));
        };
        if !relative.is_empty() && self.store.is_excluded(&relative, true) {
            info!("Skipping ignored directory: {relative}");
            return Ok(false);
        }
        Ok(true)
    }

    pub(crate) fn decide(&self, listed: Listed) -> Decision {
        if listed.name == VCS_DIR {
            debug!("Skipping {}", listed.path.display());
            return Decision::Skip;
        }

        let Some(entry) = FileEntry::new(self.store.root(), listed.path, listed.is_dir) else {
            return Decision::Skip;
        };

        if self.store.is_excluded(&entry.relative_path, entry.is_directory) {
            debug!("Ignored by patterns: {}", entry.relative_path);
            return Decision::Skip;
        }

        if entry.is_directory {
            return Decision::Descend(entry.absolute_path);
        }

        if !self.policy.admits(&entry.extension) {
            debug!("Skipping unsupported file type: {}", entry.relative_path);
            return Decision::Skip;
        }

        Decision::Admit(entry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Pending,
    Running,
    Done,
}

/// Lazy depth-first walk of a workspace subtree.
///
/// Entries within a directory are visited in file-name order, so the output
/// is reproducible. A directory rejected by the patterns is pruned before
/// its entries are visited. An unreadable directory is recorded in
/// [`Walk::warnings`] and the walk continues with its siblings.
pub struct Walk {
    start: PathBuf,
    scanner: Scanner,
    cancel: CancellationToken,
    inner: Option<walkdir::IntoIter>,
    warnings: Vec<TraversalWarning>,
    state: State,
}

impl Walk {
    /// Walk `start` (absolute, or relative to the store's root).
    pub fn new(start: impl AsRef<Path>, store: Arc<PatternStore>, policy: TraversalPolicy) -> Self {
        let start = store.root().join(start);
        Self {
            start,
            scanner: Scanner::new(store, policy),
            cancel: CancellationToken::new(),
            inner: None,
            warnings: Vec::new(),
            state: State::Pending,
        }
    }

    /// Stop between directories once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Warnings raised so far.
    pub fn warnings(&self) -> &[TraversalWarning] {
        &self.warnings
    }

    /// Drain the walk. Any error discards what was collected.
    pub fn collect_all(mut self) -> Result<Collected> {
        let mut entries = Vec::new();
        for item in self.by_ref() {
            entries.push(item?);
        }
        info!(
            "Traversal complete: {} file(s), {} warning(s)",
            entries.len(),
            self.warnings.len()
        );
        Ok(Collected {
            entries,
            warnings: self.warnings,
        })
    }

    fn start(&mut self) -> Option<Result<FileEntry>> {
        match self.scanner.check_start(&self.start) {
            Ok(true) => {}
            Ok(false) => {
                self.state = State::Done;
                return None;
            }
            Err(e) => return self.fail(e),
        }
        if self.cancel.is_cancelled() {
            return self.fail(TraversalError::Cancelled);
        }
        debug!("Processing directory: {}", self.start.display());
        self.inner = Some(
            WalkDir::new(&self.start)
                .min_depth(1)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter(),
        );
        None
    }

    fn fail(&mut self, error: TraversalError) -> Option<Result<FileEntry>> {
        self.state = State::Done;
        self.inner = None;
        Some(Err(error))
    }
}

impl Iterator for Walk {
    type Item = Result<FileEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            State::Done => return None,
            State::Running => {}
            State::Pending => {
                self.state = State::Running;
                if let Some(failed) = self.start() {
                    return Some(failed);
                }
            }
        }

        loop {
            let entry = match self.inner.as_mut().and_then(Iterator::next) {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    let warning = TraversalWarning::walk(&e, &self.start);
                    self.warnings.push(warning);
                    continue;
                }
                None => {
                    self.state = State::Done;
                    self.inner = None;
                    return None;
                }
            };

            let is_dir = entry.file_type().is_dir();
            if is_dir && self.cancel.is_cancelled() {
                return self.fail(TraversalError::Cancelled);
            }
            let Some(listed) = Listed::from_walk(entry) else {
                continue;
            };

            match self.scanner.decide(listed) {
                Decision::Skip if is_dir => {
                    if let Some(inner) = self.inner.as_mut() {
                        inner.skip_current_dir();
                    }
                }
                Decision::Skip => {}
                Decision::Descend(dir) => debug!("Processing directory: {}", dir.display()),
                Decision::Admit(entry) => return Some(Ok(entry)),
            }
        }
    }
}
