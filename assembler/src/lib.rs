//! # Context Assembler
//!
//! This crate turns a workspace into one LLM-ready context document by
//! combining:
//!
//! - **Patterns**: Hierarchical ignore files
//! - **Traversal**: Ordered, ignore-aware directory walks
//! - **Imports**: Expansion of an open file through its static imports
//! - **Tokens**: Estimation of the document's token footprint
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Context Assembler                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │   Pattern    │  │  Traversal   │  │    Import    │           │
//! │  │    Store     │─▶│    Engine    │  │   Resolver   │           │
//! │  └──────────────┘  └──────────────┘  └──────────────┘           │
//! │                           │                 │                   │
//! │                           └────────┬────────┘                   │
//! │                                    ▼                            │
//! │                           ┌──────────────┐                      │
//! │                           │  Fragments   │                      │
//! │                           │  + Template  │                      │
//! │                           └──────────────┘                      │
//! │                                    │                            │
//! │                                    ▼                            │
//! │                           ┌──────────────┐                      │
//! │                           │    Token     │                      │
//! │                           │  Estimator   │                      │
//! │                           └──────────────┘                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ctxgen_assembler::{ContextAssembler, ContextConfig, SelectionRequest};
//!
//! let config = ContextConfig::discover("path/to/project")?;
//! let assembler = ContextAssembler::new("path/to/project", config)?;
//!
//! let output = assembler
//!     .generate(&SelectionRequest::OpenFile("src/main.ts".into()))
//!     .await?;
//! println!("{}", output.document);
//! eprintln!("{}", output.summary());
//! ```

pub mod assembler;
pub mod config;
pub mod error;
pub mod fragment;
pub mod output;
pub mod request;

pub use assembler::{ContextAssembler, ContextAssemblerBuilder};
pub use config::{CONFIG_FILE_NAME, ContextConfig};
pub use error::{AssemblerError, Result};
pub use fragment::{ContextFragment, FragmentFormatter, TemplateFormatter, markdown_lang};
pub use output::{Assembly, ContextOutput, NO_FILES_WARNING};
pub use request::SelectionRequest;

// Re-export from dependencies for convenience
pub use ctxgen_imports::{ImportExtractor, RegexImportExtractor};
pub use ctxgen_patterns::{PatternStore, PatternStoreConfig};
pub use ctxgen_tokens::{TiktokenTokenizer, TokenEstimator, Tokenizer};
pub use tokio_util::sync::CancellationToken;
