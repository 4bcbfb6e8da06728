//! # Ignore Pattern Scopes
//!
//! This crate answers one question for the context generator: is a given
//! workspace-relative path excluded by the ignore files found in the tree?
//!
//! ## Features
//!
//! - **Multiple Dialects**: Any set of ignore-file names (`.gitignore`,
//!   `.dockerignore`, ...) is honoured, all with gitignore semantics
//! - **Nested Scopes**: Each directory holding an ignore file gets its own
//!   scope, interpreted relative to that directory
//! - **Negation**: `!pattern` re-includes paths within the same scope
//! - **Explicit Rebuild**: The store is immutable once built and rebuilt
//!   wholesale when an ignore file changes
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Pattern Store                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ignore files ──► PatternRule ──► PatternScope (per directory)  │
//! │                                        │                        │
//! │  root scope ──────────────────────────►▼                        │
//! │                        is_excluded: root → ancestors, OR        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod paths;
pub mod rule;
pub mod scope;
pub mod store;

pub use config::PatternStoreConfig;
pub use error::{PatternError, Result};
pub use paths::{VCS_DIR, extension_of, normalize_relative, relative_to};
pub use rule::{PatternRule, parse_patterns};
pub use scope::PatternScope;
pub use store::PatternStore;
