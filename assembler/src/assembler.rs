//! Context assembler implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ctxgen_imports::{ImportExtractor, ImportResolver, RegexImportExtractor};
use ctxgen_patterns::{PatternStore, extension_of, relative_to};
use ctxgen_tokens::TokenEstimator;
use ctxgen_traversal::{Collected, TraversalPolicy, Walk, collect_parallel};
use path_absolutize::Absolutize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ContextConfig;
use crate::error::{AssemblerError, Result};
use crate::fragment::{ContextFragment, FragmentFormatter, TemplateFormatter};
use crate::output::{Assembly, ContextOutput, NO_FILES_WARNING};
use crate::request::SelectionRequest;

/// A selected file, validated against the workspace.
#[derive(Debug)]
struct Selected {
    absolute: PathBuf,
    relative: String,
}

/// Builds context documents for one workspace.
///
/// This is the main entry point. It owns the workspace's pattern store and
/// coordinates:
/// - Traversal of the whole tree
/// - Import expansion of an open file
/// - Rendering fragments and estimating tokens
///
/// The assembler keeps no state between calls. When an ignore file changes
/// the caller invokes [`ContextAssembler::rebuild_patterns`].
pub struct ContextAssembler {
    /// Configuration.
    config: ContextConfig,

    /// Ignore patterns of the workspace.
    store: Arc<PatternStore>,

    /// Traversal policy derived from the configuration.
    policy: TraversalPolicy,

    /// Pulls import specifiers out of file content.
    extractor: Box<dyn ImportExtractor>,

    /// Maps specifiers to workspace files.
    resolver: ImportResolver,

    /// Renders fragments.
    formatter: Box<dyn FragmentFormatter>,

    /// Estimates the document's token count.
    estimator: TokenEstimator,
}

impl ContextAssembler {
    /// Create a new assembler builder.
    pub fn builder(workspace_root: impl Into<PathBuf>) -> ContextAssemblerBuilder {
        ContextAssemblerBuilder::new(workspace_root)
    }

    /// Create an assembler with the default collaborators.
    pub fn new(workspace_root: impl Into<PathBuf>, config: ContextConfig) -> Result<Self> {
        Self::builder(workspace_root).with_config(config).build()
    }

    /// Workspace root.
    pub fn workspace_root(&self) -> &Path {
        self.store.root()
    }

    /// Active configuration.
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// The workspace's pattern store.
    pub fn patterns(&self) -> &PatternStore {
        &self.store
    }

    /// Re-read every ignore file in the workspace.
    pub fn rebuild_patterns(&mut self) -> Result<()> {
        Arc::make_mut(&mut self.store).rebuild()?;
        info!("Rebuilt ignore patterns for {}", self.workspace_root().display());
        Ok(())
    }

    /// Select fragments for `request`.
    pub async fn assemble(&self, request: &SelectionRequest) -> Result<Assembly> {
        self.assemble_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Select fragments for `request`, stopping once `cancel` fires.
    ///
    /// A cancelled assembly returns [`AssemblerError::Cancelled`] and
    /// nothing it collected.
    pub async fn assemble_with_cancel(
        &self,
        request: &SelectionRequest,
        cancel: &CancellationToken,
    ) -> Result<Assembly> {
        info!("Assembling context ({})", request.mode());
        let mut assembly = Assembly::default();

        match request {
            SelectionRequest::WholeTree => self.whole_tree(cancel, &mut assembly).await?,
            SelectionRequest::OpenFile(path) => {
                let selected = self.select(path)?;
                if selected.absolute.is_dir() {
                    return Err(AssemblerError::NotAFile(selected.relative));
                }
                self.open_file(&selected, cancel, &mut assembly).await?;
            }
            SelectionRequest::ExplicitFiles(paths) => {
                self.explicit_files(paths, cancel, &mut assembly).await?;
            }
        }

        if self.config.include_manifest {
            self.push_manifest(&mut assembly).await;
        }
        ensure_active(cancel)?;

        info!(
            "Context assembled: {} fragment(s), {} warning(s)",
            assembly.fragments.len(),
            assembly.warnings.len()
        );
        Ok(assembly)
    }

    /// Render fragments into one document, each followed by a blank line.
    pub fn render(&self, fragments: &[ContextFragment]) -> String {
        let mut document = String::new();
        for fragment in fragments {
            document.push_str(&self.formatter.format(fragment));
            document.push_str("\n\n");
        }
        document
    }

    /// Assemble, render and estimate tokens.
    pub async fn generate(&self, request: &SelectionRequest) -> Result<ContextOutput> {
        self.generate_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// [`ContextAssembler::generate`] with cancellation.
    pub async fn generate_with_cancel(
        &self,
        request: &SelectionRequest,
        cancel: &CancellationToken,
    ) -> Result<ContextOutput> {
        let Assembly {
            fragments,
            mut warnings,
        } = self.assemble_with_cancel(request, cancel).await?;

        if fragments.is_empty() {
            warn!("{NO_FILES_WARNING}");
            warnings.push(NO_FILES_WARNING.to_string());
        }

        let document = self.render(&fragments);
        let token_count = self.estimator.estimate(&document);

        Ok(ContextOutput {
            document,
            token_count,
            fragment_count: fragments.len(),
            token_warning_threshold: self.config.token_warning_threshold,
            warnings,
        })
    }

    async fn whole_tree(&self, cancel: &CancellationToken, assembly: &mut Assembly) -> Result<()> {
        let root = self.workspace_root().to_path_buf();
        let collected: Collected = if self.config.parallel_traversal {
            collect_parallel(&root, Arc::clone(&self.store), self.policy.clone(), cancel.clone())
                .await?
        } else {
            let walk = Walk::new(&root, Arc::clone(&self.store), self.policy.clone())
                .with_cancellation(cancel.clone());
            tokio::task::spawn_blocking(move || walk.collect_all()).await??
        };

        assembly
            .warnings
            .extend(collected.warnings.iter().map(ToString::to_string));

        for entry in collected.entries {
            ensure_active(cancel)?;
            if let Some(fragment) =
                read_fragment(&entry.absolute_path, entry.relative_path, entry.extension, assembly)
                    .await
            {
                assembly.fragments.push(fragment);
            }
        }
        Ok(())
    }

    async fn open_file(
        &self,
        selected: &Selected,
        cancel: &CancellationToken,
        assembly: &mut Assembly,
    ) -> Result<()> {
        let Some(content) = self.push_selected(selected, assembly).await else {
            return Ok(());
        };

        let specifiers = self.extractor.extract(&content);
        debug!(
            "Found {} import(s) in {}",
            specifiers.len(),
            selected.relative
        );

        for specifier in specifiers {
            ensure_active(cancel)?;
            let Some(resolved) =
                self.resolver
                    .resolve(&selected.absolute, &specifier, &self.store)
            else {
                continue;
            };
            debug!("Import {specifier:?} resolved to {}", resolved.relative_path);
            if let Some(fragment) = read_fragment(
                &resolved.absolute_path,
                resolved.relative_path,
                resolved.extension,
                assembly,
            )
            .await
            {
                assembly.fragments.push(fragment);
            }
        }
        Ok(())
    }

    async fn explicit_files(
        &self,
        paths: &[PathBuf],
        cancel: &CancellationToken,
        assembly: &mut Assembly,
    ) -> Result<()> {
        match paths {
            [] => Err(AssemblerError::NoFilesSelected),
            [path] => {
                let selected = self.select(path)?;
                if selected.absolute.is_dir() {
                    warn!("Skipping directory {}", selected.relative);
                    assembly.warn(format!("Skipped directory \"{}\".", selected.relative));
                } else {
                    self.push_selected(&selected, assembly).await;
                }
                Ok(())
            }
            paths => {
                for path in paths {
                    ensure_active(cancel)?;
                    let selected = match self.select(path) {
                        Ok(selected) => selected,
                        Err(e) => {
                            warn!("Skipping {}: {e}", path.display());
                            assembly.warn(format!("Skipped {}: {e}", path.display()));
                            continue;
                        }
                    };
                    if selected.absolute.is_dir() {
                        debug!("Skipping directory {}", selected.relative);
                        continue;
                    }
                    let extension = extension_of(&selected.absolute);
                    if let Some(fragment) =
                        read_fragment(&selected.absolute, selected.relative, extension, assembly)
                            .await
                    {
                        assembly.fragments.push(fragment);
                    }
                }
                Ok(())
            }
        }
    }

    /// Push a deliberately selected file. Returns its content when it could
    /// be read, whether or not a fragment was emitted.
    async fn push_selected(&self, selected: &Selected, assembly: &mut Assembly) -> Option<String> {
        let extension = extension_of(&selected.absolute);
        let ignored = self.store.is_excluded(&selected.relative, false);

        let admitted = if self.config.force_include_selected {
            if ignored {
                let note = forced_include_note(&selected.absolute);
                warn!("{note}");
                assembly.warn(note);
            }
            true
        } else if ignored {
            warn!("Skipping {}: matches ignore patterns", selected.relative);
            assembly.warn(format!(
                "Skipped \"{}\": it matches patterns in your ignore files.",
                selected.relative
            ));
            false
        } else if !self.policy.admits(&extension) {
            warn!("Skipping {}: unsupported file type", selected.relative);
            assembly.warn(format!(
                "Skipped \"{}\": .{extension} is not a detected extension.",
                selected.relative
            ));
            false
        } else {
            true
        };

        let fragment = read_fragment(
            &selected.absolute,
            selected.relative.clone(),
            extension,
            assembly,
        )
        .await?;
        let content = fragment.content.clone();
        if admitted {
            assembly.fragments.push(fragment);
        }
        Some(content)
    }

    async fn push_manifest(&self, assembly: &mut Assembly) {
        let path = self.workspace_root().join(&self.config.manifest_file);
        if !path.is_file() {
            debug!("No manifest at {}", path.display());
            return;
        }
        let relative = self.config.manifest_file.replace('\\', "/");
        let extension = extension_of(&path);
        if let Some(fragment) = read_fragment(&path, relative, extension, assembly).await {
            assembly.fragments.push(fragment);
        }
    }

    /// Resolve a caller-supplied path against the workspace root.
    fn select(&self, path: &Path) -> Result<Selected> {
        let root = self.workspace_root();
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        };
        let absolute = joined
            .absolutize()
            .map_err(|_| AssemblerError::FileNotFound(path.display().to_string()))?
            .into_owned();

        let relative = relative_to(root, &absolute)
            .ok_or_else(|| AssemblerError::OutsideWorkspace(path.display().to_string()))?;
        if relative.is_empty() {
            return Err(AssemblerError::NotAFile(path.display().to_string()));
        }
        if !absolute.exists() {
            return Err(AssemblerError::FileNotFound(relative));
        }
        Ok(Selected { absolute, relative })
    }
}

impl std::fmt::Debug for ContextAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextAssembler")
            .field("workspace_root", &self.workspace_root())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ContextAssembler`].
pub struct ContextAssemblerBuilder {
    workspace_root: PathBuf,
    config: ContextConfig,
    extractor: Option<Box<dyn ImportExtractor>>,
    formatter: Option<Box<dyn FragmentFormatter>>,
    estimator: Option<TokenEstimator>,
}

impl ContextAssemblerBuilder {
    /// Create a new builder.
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            config: ContextConfig::default(),
            extractor: None,
            formatter: None,
            estimator: None,
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: ContextConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the import extractor.
    pub fn with_extractor(mut self, extractor: impl ImportExtractor + 'static) -> Self {
        self.extractor = Some(Box::new(extractor));
        self
    }

    /// Replace the fragment formatter. Overrides `file_template`.
    pub fn with_formatter(mut self, formatter: impl FragmentFormatter + 'static) -> Self {
        self.formatter = Some(Box::new(formatter));
        self
    }

    /// Replace the token estimator.
    pub fn with_estimator(mut self, estimator: TokenEstimator) -> Self {
        self.estimator = Some(estimator);
        self
    }

    /// Build the assembler, loading the workspace's ignore files.
    pub fn build(self) -> Result<ContextAssembler> {
        let root = self
            .workspace_root
            .absolutize()
            .map_err(|_| {
                AssemblerError::WorkspaceNotFound(self.workspace_root.display().to_string())
            })?
            .into_owned();
        if !root.is_dir() {
            return Err(AssemblerError::WorkspaceNotFound(
                root.display().to_string(),
            ));
        }

        let mut config = self.config;
        config.normalize();

        let store = PatternStore::build(&root, &config.pattern_store_config())?;
        let extractor = match self.extractor {
            Some(extractor) => extractor,
            None => Box::new(RegexImportExtractor::standard()?),
        };
        let formatter = self
            .formatter
            .unwrap_or_else(|| Box::new(TemplateFormatter::new(&config.file_template)));

        info!(
            "Context assembler ready for {} ({} ignore scope(s))",
            root.display(),
            store.scopes().count()
        );

        Ok(ContextAssembler {
            policy: config.traversal_policy(),
            resolver: ImportResolver::new(&root, config.detected_extensions.clone()),
            store: Arc::new(store),
            extractor,
            formatter,
            estimator: self.estimator.unwrap_or_default(),
            config,
        })
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(AssemblerError::Cancelled)
    } else {
        Ok(())
    }
}

fn forced_include_note(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "Note: \"{name}\" matches patterns in your ignore files but will be included anyway since it was specifically selected."
    )
}

/// Read a file into a fragment. Unreadable or non-UTF-8 files become a
/// warning instead.
async fn read_fragment(
    path: &Path,
    relative_path: String,
    extension: String,
    assembly: &mut Assembly,
) -> Option<ContextFragment> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            debug!("Added to context: {relative_path}");
            Some(ContextFragment {
                relative_path,
                extension,
                content,
            })
        }
        Err(e) => {
            warn!("Error reading {relative_path}: {e}");
            assembly.warn(format!("Skipped {relative_path}: {e}"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn workspace(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for (path, content) in files {
            let path = temp_dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        temp_dir
    }

    fn paths(assembly: &Assembly) -> Vec<&str> {
        assembly
            .fragments
            .iter()
            .map(|f| f.relative_path.as_str())
            .collect()
    }

    #[test]
    fn test_missing_workspace() {
        let temp_dir = TempDir::new().unwrap();
        let result = ContextAssembler::new(temp_dir.path().join("nope"), ContextConfig::default());
        assert!(matches!(result, Err(AssemblerError::WorkspaceNotFound(_))));
    }

    #[tokio::test]
    async fn test_whole_tree_sequential_and_parallel_agree() {
        let temp_dir = workspace(&[
            (".gitignore", "dist/\n"),
            ("src/b.ts", "b"),
            ("src/a.ts", "a"),
            ("dist/out.js", "x"),
            ("README.md", "# hi"),
            ("image.png", "png"),
        ]);

        let sequential = ContextAssembler::new(temp_dir.path(), ContextConfig::default())
            .unwrap()
            .assemble(&SelectionRequest::WholeTree)
            .await
            .unwrap();
        let parallel = ContextAssembler::new(
            temp_dir.path(),
            ContextConfig::default().with_parallel_traversal(true),
        )
        .unwrap()
        .assemble(&SelectionRequest::WholeTree)
        .await
        .unwrap();

        assert_eq!(paths(&sequential), vec!["README.md", "src/a.ts", "src/b.ts"]);
        assert_eq!(sequential, parallel);
    }

    #[tokio::test]
    async fn test_open_file_forced_include_warns() {
        let temp_dir = workspace(&[
            (".gitignore", "secret.ts\n"),
            ("secret.ts", "import { a } from './a';"),
            ("a.ts", "export const a = 1;"),
        ]);
        let assembler = ContextAssembler::new(temp_dir.path(), ContextConfig::default()).unwrap();

        let assembly = assembler
            .assemble(&SelectionRequest::OpenFile("secret.ts".into()))
            .await
            .unwrap();

        assert_eq!(paths(&assembly), vec!["secret.ts", "a.ts"]);
        assert_eq!(
            assembly.warnings,
            vec![
                "Note: \"secret.ts\" matches patterns in your ignore files but will be included anyway since it was specifically selected."
            ]
        );
    }

    #[tokio::test]
    async fn test_open_file_without_forced_include() {
        let temp_dir = workspace(&[
            (".gitignore", "secret.ts\n"),
            ("secret.ts", "import './a';"),
            ("a.ts", "a"),
        ]);
        let config = ContextConfig::default().with_force_include(false);
        let assembler = ContextAssembler::new(temp_dir.path(), config).unwrap();

        let assembly = assembler
            .assemble(&SelectionRequest::OpenFile("secret.ts".into()))
            .await
            .unwrap();

        assert_eq!(paths(&assembly), vec!["a.ts"]);
        assert_eq!(assembly.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_open_file_preconditions() {
        let temp_dir = workspace(&[("src/a.ts", "a")]);
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("o.ts"), "o").unwrap();
        let assembler = ContextAssembler::new(temp_dir.path(), ContextConfig::default()).unwrap();

        let missing = assembler
            .assemble(&SelectionRequest::OpenFile("src/missing.ts".into()))
            .await;
        assert!(matches!(missing, Err(AssemblerError::FileNotFound(_))));

        let directory = assembler
            .assemble(&SelectionRequest::OpenFile("src".into()))
            .await;
        assert!(matches!(directory, Err(AssemblerError::NotAFile(_))));

        let escaped = assembler
            .assemble(&SelectionRequest::OpenFile(outside.path().join("o.ts")))
            .await;
        assert!(matches!(escaped, Err(AssemblerError::OutsideWorkspace(_))));
    }

    #[tokio::test]
    async fn test_explicit_files() {
        let temp_dir = workspace(&[
            (".gitignore", "gen/\n"),
            ("gen/api.ts", "api"),
            ("notes.txt", "notes"),
            ("a.ts", "import './b';"),
            ("b.ts", "b"),
        ]);
        let assembler = ContextAssembler::new(temp_dir.path(), ContextConfig::default()).unwrap();

        let empty = assembler
            .assemble(&SelectionRequest::ExplicitFiles(Vec::new()))
            .await;
        assert!(matches!(empty, Err(AssemblerError::NoFilesSelected)));

        // A single file is not expanded through its imports.
        let single = assembler
            .assemble(&SelectionRequest::files(["a.ts"]))
            .await
            .unwrap();
        assert_eq!(paths(&single), vec!["a.ts"]);

        // Several files are taken as given, directories aside.
        let many = assembler
            .assemble(&SelectionRequest::files(["notes.txt", "gen", "gen/api.ts"]))
            .await
            .unwrap();
        assert_eq!(paths(&many), vec!["notes.txt", "gen/api.ts"]);
        assert!(many.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_manifest_is_appended() {
        let temp_dir = workspace(&[("a.ts", "a"), ("package.json", "{}")]);
        let config = ContextConfig::default().with_manifest(true);
        let assembler = ContextAssembler::new(temp_dir.path(), config).unwrap();

        let assembly = assembler
            .assemble(&SelectionRequest::files(["a.ts"]))
            .await
            .unwrap();

        assert_eq!(paths(&assembly), vec!["a.ts", "package.json"]);
    }

    #[tokio::test]
    async fn test_generate_empty_selection() {
        let temp_dir = workspace(&[("image.png", "png")]);
        let assembler = ContextAssembler::new(temp_dir.path(), ContextConfig::default()).unwrap();

        let output = assembler.generate(&SelectionRequest::WholeTree).await.unwrap();

        assert_eq!(output.document, "");
        assert_eq!(output.token_count, 0);
        assert_eq!(output.fragment_count, 0);
        assert_eq!(output.warnings, vec![NO_FILES_WARNING]);
    }

    #[tokio::test]
    async fn test_generate_renders_template() {
        let temp_dir = workspace(&[("a.ts", "let a;")]);
        let config = ContextConfig::default().with_template("// {filePath}\\n{fileContent}");
        let assembler = ContextAssembler::new(temp_dir.path(), config).unwrap();

        let output = assembler.generate(&SelectionRequest::WholeTree).await.unwrap();

        assert_eq!(output.document, "// a.ts\nlet a;\n\n");
        assert_eq!(output.fragment_count, 1);
        assert!(output.token_count > 0);
    }

    #[tokio::test]
    async fn test_cancelled_assembly() {
        let temp_dir = workspace(&[("a.ts", "a")]);
        let assembler = ContextAssembler::new(temp_dir.path(), ContextConfig::default()).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = assembler
            .assemble_with_cancel(&SelectionRequest::WholeTree, &cancel)
            .await;

        assert!(matches!(result, Err(AssemblerError::Cancelled)));
    }

    #[tokio::test]
    async fn test_rebuild_patterns() {
        let temp_dir = workspace(&[("a.ts", "a"), ("b.ts", "b")]);
        let mut assembler =
            ContextAssembler::new(temp_dir.path(), ContextConfig::default()).unwrap();

        fs::write(temp_dir.path().join(".gitignore"), "b.ts\n").unwrap();
        assembler.rebuild_patterns().unwrap();

        let assembly = assembler.assemble(&SelectionRequest::WholeTree).await.unwrap();
        assert_eq!(paths(&assembly), vec!["a.ts"]);
    }
}
