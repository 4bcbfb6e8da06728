//! Context fragments and their rendering.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_FILE_TEMPLATE;

/// One file's contribution to the context document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextFragment {
    /// Path relative to the workspace root, `/`-separated.
    pub relative_path: String,

    /// Lowercase extension without the dot.
    pub extension: String,

    /// File content.
    pub content: String,
}

impl ContextFragment {
    /// Create a fragment.
    pub fn new(
        relative_path: impl Into<String>,
        extension: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            extension: extension.into(),
            content: content.into(),
        }
    }
}

/// Turns a fragment into text.
pub trait FragmentFormatter: Send + Sync {
    /// Render one fragment.
    fn format(&self, fragment: &ContextFragment) -> String;
}

/// Formatter driven by a placeholder template.
///
/// `{filePath}`, `{markdownLang}` and `{fileContent}` are each replaced once,
/// content last so placeholders inside files are left alone. A literal `\n`
/// in the template becomes a newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFormatter {
    template: String,
}

impl TemplateFormatter {
    /// Create a formatter for `template`.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.replace("\\n", "\n"),
        }
    }

    /// The template, with escapes expanded.
    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Default for TemplateFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_TEMPLATE)
    }
}

impl FragmentFormatter for TemplateFormatter {
    fn format(&self, fragment: &ContextFragment) -> String {
        self.template
            .replacen("{filePath}", &fragment.relative_path, 1)
            .replacen("{markdownLang}", markdown_lang(&fragment.extension), 1)
            .replacen("{fileContent}", &fragment.content, 1)
    }
}

/// Markdown code-fence language for an extension.
pub fn markdown_lang(extension: &str) -> &str {
    match extension {
        "js" => "javascript",
        "ts" => "typescript",
        "md" => "markdown",
        "rs" => "rust",
        "py" => "python",
        other => other,
    }
}
