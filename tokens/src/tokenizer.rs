//! Tokenizer implementations.

use serde::{Deserialize, Serialize};
use tiktoken_rs::CoreBPE;
use tracing::debug;

use crate::error::{Result, TokenizerError};

/// Counts tokens exactly.
pub trait Tokenizer: Send + Sync {
    /// Get the name of this tokenizer.
    fn name(&self) -> &str;

    /// Count the tokens in `text`.
    fn count(&self, text: &str) -> Result<usize>;
}

/// BPE encodings shipped with `tiktoken`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// GPT-3.5 / GPT-4 encoding.
    #[default]
    Cl100kBase,
    /// GPT-4o encoding.
    O200kBase,
}

impl Encoding {
    fn name(self) -> &'static str {
        match self {
            Self::Cl100kBase => "cl100k_base",
            Self::O200kBase => "o200k_base",
        }
    }

    fn load(self) -> Result<CoreBPE> {
        let loaded = match self {
            Self::Cl100kBase => tiktoken_rs::cl100k_base(),
            Self::O200kBase => tiktoken_rs::o200k_base(),
        };
        loaded.map_err(|e| TokenizerError::Unavailable {
            name: self.name().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Tokenizer backed by a `tiktoken` encoding.
///
/// The encoding tables are loaded for each count and dropped when the count
/// returns, whichever way it returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiktokenTokenizer {
    encoding: Encoding,
}

impl TiktokenTokenizer {
    /// Create a tokenizer for `encoding`.
    pub fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn name(&self) -> &str {
        self.encoding.name()
    }

    fn count(&self, text: &str) -> Result<usize> {
        if text.is_empty() {
            return Ok(0);
        }
        let bpe = self.encoding.load()?;
        let count = bpe.encode_with_special_tokens(text).len();
        debug!("{} counted {count} tokens", self.encoding.name());
        Ok(count)
    }
}
