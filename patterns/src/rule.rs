//! Parsing of ignore-file lines into pattern rules.

use serde::{Deserialize, Serialize};

/// Characters with glob meaning, escaped when a rule is demoted to a literal.
const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}', '\\', '!'];

/// One parsed line of an ignore file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    /// Glob text with the negation prefix and leading separator removed.
    pub glob: String,

    /// Whether the rule re-includes what it matches (`!` prefix).
    pub negated: bool,

    /// Whether the rule is anchored at its scope directory (leading `/`).
    pub anchored: bool,
}

impl PatternRule {
    /// Parse a single ignore-file line.
    ///
    /// Returns `None` for blank lines, comments and lines that carry no glob.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (negated, rest) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        let (anchored, glob) = match rest.strip_prefix('/') {
            Some(glob) => (true, glob),
            None => (false, rest),
        };

        if glob.is_empty() {
            return None;
        }

        Some(Self {
            glob: glob.to_string(),
            negated,
            anchored,
        })
    }

    /// Rule matching `name` at any depth below the scope.
    pub fn literal(name: &str) -> Self {
        Self {
            glob: escape_glob(name),
            negated: false,
            anchored: false,
        }
    }

    /// Render the rule back into gitignore syntax.
    pub fn to_line(&self) -> String {
        render(&self.glob, self.negated, self.anchored)
    }

    /// Render the rule with every glob character escaped.
    pub fn to_literal_line(&self) -> String {
        render(&escape_glob(&self.glob), self.negated, self.anchored)
    }
}

/// Parse ignore-file content into rules, preserving order.
///
/// A leading UTF-8 byte-order mark is skipped.
pub fn parse_patterns(content: &str) -> Vec<PatternRule> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    content.lines().filter_map(PatternRule::parse).collect()
}

fn render(glob: &str, negated: bool, anchored: bool) -> String {
    let mut line = String::with_capacity(glob.len() + 2);
    if negated {
        line.push('!');
    }
    if anchored {
        line.push('/');
    }
    line.push_str(glob);
    line
}

fn escape_glob(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if GLOB_META.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
