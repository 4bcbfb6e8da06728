//! # Import Resolution
//!
//! Finds the static imports of a source file and maps them to files in the
//! workspace. Extraction is lexical: a regular expression recognises
//! `import ... from "x"`, `import "x"` and `import("x")`. Anything that
//! implements [`ImportExtractor`] can replace it.

pub mod error;
pub mod extract;
pub mod resolve;

pub use error::{ImportError, Result};
pub use extract::{ImportExtractor, RegexImportExtractor};
pub use resolve::{ImportResolver, ResolvedImport};
