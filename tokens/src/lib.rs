//! # Token Estimation
//!
//! Estimates how many tokens a generated context will cost.
//!
//! ## Features
//!
//! - **BPE Counting**: Exact counts via `tiktoken` encodings
//! - **Heuristic Fallback**: `ceil(words * 1.3)` when the tokenizer is
//!   unavailable or fails
//! - **Pluggable**: Any [`Tokenizer`] can be the primary strategy

pub mod error;
pub mod estimator;
pub mod tokenizer;

pub use error::{Result, TokenizerError};
pub use estimator::{EstimateStrategy, TokenEstimate, TokenEstimator, heuristic_count};
pub use tokenizer::{Encoding, TiktokenTokenizer, Tokenizer};
