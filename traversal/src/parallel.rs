//! Parallel traversal with one task per subdirectory.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use ctxgen_patterns::PatternStore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::TraversalPolicy;
use crate::entry::FileEntry;
use crate::error::{Result, TraversalError};
use crate::walk::{Collected, Decision, Listed, Scanner, TraversalWarning};

type Branch = Pin<Box<dyn Future<Output = Result<Collected>> + Send>>;

/// Output slot of a directory, kept in listing order.
enum Slot {
    File(FileEntry),
    Branch(JoinHandle<Result<Collected>>),
}

/// Collect admitted files, exploring subdirectories concurrently.
///
/// Every branch accumulates into its own [`Collected`], merged into its
/// parent's in listing order once the branch finishes, so the result is
/// identical to the sequential [`Walk`](crate::Walk). A failing directory
/// only adds a warning; cancellation discards everything.
pub async fn collect_parallel(
    start: impl AsRef<Path>,
    store: Arc<PatternStore>,
    policy: TraversalPolicy,
    cancel: CancellationToken,
) -> Result<Collected> {
    let start = store.root().join(start);
    let scanner = Arc::new(Scanner::new(store, policy));

    if !scanner.check_start(&start)? {
        return Ok(Collected::default());
    }

    let collected = visit(start, scanner, cancel).await?;
    info!(
        "Parallel traversal complete: {} file(s), {} warning(s)",
        collected.entries.len(),
        collected.warnings.len()
    );
    Ok(collected)
}

fn visit(dir: PathBuf, scanner: Arc<Scanner>, cancel: CancellationToken) -> Branch {
    Box::pin(async move {
        if cancel.is_cancelled() {
            return Err(TraversalError::Cancelled);
        }

        let mut collected = Collected::default();
        debug!("Processing directory: {}", dir.display());
        let listing = match list_dir(&dir).await {
            Ok((listing, warnings)) => {
                collected.warnings.extend(warnings);
                listing
            }
            Err(e) => {
                collected.warnings.push(TraversalWarning::io(&dir, &e));
                return Ok(collected);
            }
        };

        let mut slots = Vec::with_capacity(listing.len());
        for listed in listing {
            match scanner.decide(listed) {
                Decision::Skip => {}
                Decision::Descend(child) => {
                    let branch = visit(child, scanner.clone(), cancel.clone());
                    slots.push(Slot::Branch(tokio::spawn(branch)));
                }
                Decision::Admit(entry) => slots.push(Slot::File(entry)),
            }
        }

        for slot in slots {
            match slot {
                Slot::File(entry) => collected.entries.push(entry),
                Slot::Branch(handle) => match handle.await {
                    Ok(branch) => collected.merge(branch?),
                    Err(e) => {
                        warn!("Traversal task under {} failed: {e}", dir.display());
                        collected.warnings.push(TraversalWarning {
                            path: dir.clone(),
                            message: e.to_string(),
                        });
                    }
                },
            }
        }

        Ok(collected)
    })
}

/// List a directory, sorted by file name.
///
/// Symbolic links to files are listed as files; links to directories are
/// not followed.
async fn list_dir(dir: &Path) -> io::Result<(Vec<Listed>, Vec<TraversalWarning>)> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut listing = Vec::new();
    let mut warnings = Vec::new();

    loop {
        let entry = match reader.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warnings.push(TraversalWarning::io(dir, &e));
                break;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type().await {
            Ok(file_type) => file_type,
            Err(e) => {
                warnings.push(TraversalWarning::io(&path, &e));
                continue;
            }
        };

        let is_dir = if file_type.is_symlink() {
            match tokio::fs::metadata(&path).await {
                Ok(target) if target.is_file() => false,
                Ok(_) => {
                    debug!("Not following symlinked directory {}", path.display());
                    continue;
                }
                Err(e) => {
                    debug!("Skipping dangling symlink {}: {e}", path.display());
                    continue;
                }
            }
        } else {
            file_type.is_dir()
        };

        listing.push(Listed {
            path,
            name: entry.file_name(),
            is_dir,
        });
    }

    listing.sort_by(|a, b| a.name.cmp(&b.name));
    Ok((listing, warnings))
}
