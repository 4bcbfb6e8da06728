//! Token estimation with graceful fallback.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::tokenizer::{TiktokenTokenizer, Tokenizer};

/// Which strategy produced an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateStrategy {
    /// Counted by the named tokenizer.
    Tokenizer(String),
    /// Approximated from the word count.
    Heuristic,
}

/// A token estimate and how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEstimate {
    /// Estimated token count.
    pub count: usize,

    /// Strategy that produced the count.
    pub strategy: EstimateStrategy,
}

/// Estimates token counts, falling back to a word-count heuristic.
pub struct TokenEstimator {
    primary: Option<Box<dyn Tokenizer>>,
}

impl TokenEstimator {
    /// Estimator using `primary`, with the heuristic as fallback.
    pub fn new(primary: impl Tokenizer + 'static) -> Self {
        Self {
            primary: Some(Box::new(primary)),
        }
    }

    /// Estimator that only uses the heuristic.
    pub fn heuristic_only() -> Self {
        Self { primary: None }
    }

    /// Estimate the token count of `text`. Never fails.
    pub fn estimate(&self, text: &str) -> usize {
        self.estimate_detailed(text).count
    }

    /// Estimate and report which strategy was used.
    pub fn estimate_detailed(&self, text: &str) -> TokenEstimate {
        if let Some(primary) = &self.primary {
            match primary.count(text) {
                Ok(count) => {
                    return TokenEstimate {
                        count,
                        strategy: EstimateStrategy::Tokenizer(primary.name().to_string()),
                    };
                }
                Err(e) => warn!("Tokenizer failed, using word-count estimate: {e}"),
            }
        }

        TokenEstimate {
            count: heuristic_count(text),
            strategy: EstimateStrategy::Heuristic,
        }
    }
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new(TiktokenTokenizer::default())
    }
}

impl std::fmt::Debug for TokenEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenEstimator")
            .field("primary", &self.primary.as_deref().map(Tokenizer::name))
            .finish()
    }
}

/// `ceil(words * 1.3)`, computed in integers as `ceil(words * 13 / 10)`.
pub fn heuristic_count(text: &str) -> usize {
    let words = text.split_whitespace().count();
    (words * 13).div_ceil(10)
}
