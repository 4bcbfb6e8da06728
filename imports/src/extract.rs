//! Lexical import extraction.

use regex_lite::Regex;

use crate::error::{ImportError, Result};

/// Matches `import ... from "x"`, `import "x"` and `import("x")`.
pub const STANDARD_IMPORT_PATTERN: &str = r#"import\s+(?:[\w{}\s*,$]*\s+from\s+)?['"]([^'"]+)['"]|import\s*\(\s*['"]([^'"]+)['"]\s*\)"#;

/// Pulls raw import specifiers out of file content.
pub trait ImportExtractor: Send + Sync {
    /// Specifiers in order of appearance, duplicates included.
    fn extract(&self, content: &str) -> Vec<String>;
}

/// Regex-based extractor. The first participating capture group of each
/// match is the specifier.
#[derive(Debug, Clone)]
pub struct RegexImportExtractor {
    pattern: Regex,
}

impl RegexImportExtractor {
    /// Extractor for ES-module style imports.
    pub fn standard() -> Result<Self> {
        Self::with_pattern(STANDARD_IMPORT_PATTERN)
    }

    /// Extractor for a custom pattern with at least one capture group.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)?;
        if pattern.captures_len() < 2 {
            return Err(ImportError::MissingCapture(pattern.as_str().to_string()));
        }
        Ok(Self { pattern })
    }
}

impl ImportExtractor for RegexImportExtractor {
    fn extract(&self, content: &str) -> Vec<String> {
        self.pattern
            .captures_iter(content)
            .filter_map(|caps| (1..caps.len()).find_map(|i| caps.get(i)))
            .map(|m| m.as_str().to_string())
            .filter(|specifier| !specifier.is_empty())
            .collect()
    }
}
