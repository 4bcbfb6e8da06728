//! Configuration for context generation.

use std::path::Path;

use ctxgen_patterns::PatternStoreConfig;
use ctxgen_traversal::TraversalPolicy;
use ctxgen_traversal::config::normalize_extension;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AssemblerError, Result};

/// File looked up at the workspace root when no config path is given.
pub const CONFIG_FILE_NAME: &str = "ctxgen.toml";

/// Template used when none is configured.
pub const DEFAULT_FILE_TEMPLATE: &str = "{filePath}\n```{markdownLang}\n{fileContent}\n```";

/// Token count above which callers are warned.
pub const DEFAULT_TOKEN_WARNING_THRESHOLD: usize = 8000;

/// Configuration for context generation.
///
/// Every field has a default, so a TOML file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Ignore-file names honoured in every directory, in priority order.
    pub ignore_files: Vec<String>,

    /// Recognised extensions, lowercase without the dot. The order is the
    /// priority used when resolving extension-less imports.
    pub detected_extensions: Vec<String>,

    /// Skip traversed files whose extension is not detected.
    pub enforce_extensions: bool,

    /// Append the dependency manifest to every context.
    pub include_manifest: bool,

    /// Manifest file name, relative to the workspace root.
    pub manifest_file: String,

    /// Template for one file, with `{filePath}`, `{markdownLang}` and
    /// `{fileContent}` placeholders.
    pub file_template: String,

    /// Include a single selected file even if ignored or of an undetected
    /// extension.
    pub force_include_selected: bool,

    /// Token count above which the output is flagged.
    pub token_warning_threshold: usize,

    /// Explore subdirectories concurrently.
    pub parallel_traversal: bool,

    /// Maximum depth searched for ignore files (None = unlimited).
    pub max_ignore_search_depth: Option<usize>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            ignore_files: vec![".gitignore".to_string(), ".dockerignore".to_string()],
            detected_extensions: ["ts", "tsx", "js", "jsx", "md", "json", "rs", "py"]
                .into_iter()
                .map(String::from)
                .collect(),
            enforce_extensions: true,
            include_manifest: false,
            manifest_file: "package.json".to_string(),
            file_template: DEFAULT_FILE_TEMPLATE.to_string(),
            force_include_selected: true,
            token_warning_threshold: DEFAULT_TOKEN_WARNING_THRESHOLD,
            parallel_traversal: false,
            max_ignore_search_depth: None,
        }
    }
}

impl ContextConfig {
    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| AssemblerError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Self = toml::from_str(&text)?;
        config.normalize();
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `ctxgen.toml` from `workspace_root`, or the defaults if absent.
    pub fn discover(workspace_root: impl AsRef<Path>) -> Result<Self> {
        let path = workspace_root.as_ref().join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Lowercase extensions, strip leading dots and drop empties and
    /// repeats, keeping the first occurrence.
    pub fn normalize(&mut self) {
        let mut seen = Vec::with_capacity(self.detected_extensions.len());
        for ext in &self.detected_extensions {
            let ext = normalize_extension(ext);
            if !ext.is_empty() && !seen.contains(&ext) {
                seen.push(ext);
            }
        }
        self.detected_extensions = seen;
        self.ignore_files.retain(|name| !name.trim().is_empty());
    }

    /// Set the ignore-file names.
    pub fn with_ignore_files<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_files = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the detected extensions.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.detected_extensions = extensions.into_iter().map(Into::into).collect();
        self.normalize();
        self
    }

    /// Turn extension enforcement on or off.
    pub fn with_enforce_extensions(mut self, enforce: bool) -> Self {
        self.enforce_extensions = enforce;
        self
    }

    /// Append the manifest to every context.
    pub fn with_manifest(mut self, include: bool) -> Self {
        self.include_manifest = include;
        self
    }

    /// Set the file template.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.file_template = template.into();
        self
    }

    /// Turn forced inclusion of a single selected file on or off.
    pub fn with_force_include(mut self, force: bool) -> Self {
        self.force_include_selected = force;
        self
    }

    /// Turn parallel traversal on or off.
    pub fn with_parallel_traversal(mut self, parallel: bool) -> Self {
        self.parallel_traversal = parallel;
        self
    }

    /// Pattern store settings derived from this configuration.
    pub fn pattern_store_config(&self) -> PatternStoreConfig {
        let config = PatternStoreConfig::new(self.ignore_files.iter().cloned());
        match self.max_ignore_search_depth {
            Some(depth) => config.with_max_depth(depth),
            None => config,
        }
    }

    /// Traversal policy derived from this configuration.
    pub fn traversal_policy(&self) -> TraversalPolicy {
        TraversalPolicy::new(&self.detected_extensions).with_enforcement(self.enforce_extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ContextConfig::default();
        assert_eq!(config.ignore_files, vec![".gitignore", ".dockerignore"]);
        assert_eq!(config.manifest_file, "package.json");
        assert_eq!(config.token_warning_threshold, 8000);
        assert!(config.enforce_extensions);
        assert!(config.force_include_selected);
        assert!(!config.include_manifest);
    }

    #[test]
    fn test_load_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"
detected_extensions = [".TS", "tsx", "ts", ""]
ignore_files = [".gitignore", ".contextignore"]
include_manifest = true
max_ignore_search_depth = 4
"#,
        )
        .unwrap();

        let config = ContextConfig::load(&path).unwrap();
        assert_eq!(config.detected_extensions, vec!["ts", "tsx"]);
        assert_eq!(config.ignore_files, vec![".gitignore", ".contextignore"]);
        assert!(config.include_manifest);
        assert_eq!(config.max_ignore_search_depth, Some(4));
        assert_eq!(config.file_template, DEFAULT_FILE_TEMPLATE);
    }

    #[test]
    fn test_discover_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ContextConfig::discover(temp_dir.path()).unwrap();
        assert_eq!(config, ContextConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "enforce_extensions = \"yes\"").unwrap();
        assert!(matches!(
            ContextConfig::load(&path),
            Err(AssemblerError::Toml(_))
        ));
    }

    #[test]
    fn test_derived_settings() {
        let config = ContextConfig::default()
            .with_extensions(["TS"])
            .with_enforce_extensions(false)
            .with_ignore_files([".contextignore"]);

        let policy = config.traversal_policy();
        assert!(!policy.enforce_extensions);
        assert!(policy.detected_extensions.contains("ts"));

        let store_config = config.pattern_store_config();
        assert_eq!(store_config.ignore_file_names, vec![".contextignore"]);
        assert_eq!(store_config.max_depth, None);
    }
}
