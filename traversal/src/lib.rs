//! # Directory Traversal
//!
//! This crate walks a workspace subtree and yields the files that belong in
//! a generated context.
//!
//! ## Features
//!
//! - **Short-circuit Exclusion**: Excluded directories are never listed
//! - **Extension Policy**: Optional allow-list of file extensions
//! - **Lazy Walk**: [`Walk`] is an iterator, entries are produced on demand
//! - **Parallel Fan-out**: [`collect_parallel`] explores subtrees concurrently
//!   and returns the same order as the sequential walk
//! - **Cancellation**: Checked before every directory listing
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Traversal Engine                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  TraversalPolicy ──► Walk / collect_parallel ──► FileEntry      │
//! │                           │                                     │
//! │                           ▼                                     │
//! │                     PatternStore          TraversalWarning      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod entry;
pub mod error;
pub mod parallel;
pub mod walk;

pub use config::TraversalPolicy;
pub use entry::FileEntry;
pub use error::{Result, TraversalError};
pub use parallel::collect_parallel;
pub use walk::{Collected, TraversalWarning, Walk};
