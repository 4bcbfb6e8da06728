//! `ctxgen` binary entrypoint.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ctxgen_assembler::{ContextAssembler, ContextConfig, ContextOutput, SelectionRequest};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "ctxgen",
    version,
    about = "Build an LLM-ready context document from a project tree",
    long_about = None
)]
struct Cli {
    /// Workspace root (defaults to the current directory).
    #[arg(long, short = 'w')]
    workspace: Option<PathBuf>,

    /// Config file (defaults to `ctxgen.toml` in the workspace when present).
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Include this file and the files it imports.
    #[arg(long, conflicts_with = "files")]
    open_file: Option<PathBuf>,

    /// Include exactly these files.
    #[arg(long, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Append the dependency manifest.
    #[arg(long)]
    include_manifest: bool,

    /// Include files of every extension when walking the tree.
    #[arg(long)]
    no_enforce_extensions: bool,

    /// Explore subdirectories concurrently.
    #[arg(long)]
    parallel: bool,

    /// Write the document to this file instead of stdout.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Print the full result as JSON.
    #[arg(long)]
    json: bool,

    /// Log debug output to stderr.
    #[arg(long, short = 'v')]
    verbose: bool,
}

impl Cli {
    fn request(&self) -> SelectionRequest {
        if let Some(path) = &self.open_file {
            SelectionRequest::OpenFile(path.clone())
        } else if !self.files.is_empty() {
            SelectionRequest::ExplicitFiles(self.files.clone())
        } else {
            SelectionRequest::WholeTree
        }
    }

    fn load_config(&self, workspace: &std::path::Path) -> Result<ContextConfig> {
        let mut config = match &self.config {
            Some(path) => ContextConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ContextConfig::discover(workspace).context("failed to load ctxgen.toml")?,
        };

        if self.include_manifest {
            config.include_manifest = true;
        }
        if self.no_enforce_extensions {
            config.enforce_extensions = false;
        }
        if self.parallel {
            config.parallel_traversal = true;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let workspace = match &cli.workspace {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    let config = cli.load_config(&workspace)?;
    debug!("Configuration: {config:?}");

    let assembler = ContextAssembler::new(&workspace, config)
        .with_context(|| format!("failed to open workspace {}", workspace.display()))?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let output = assembler
        .generate_with_cancel(&cli.request(), &cancel)
        .await
        .context("failed to generate context")?;

    emit(&cli, &output).await?;
    report(&output);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn emit(cli: &Cli, output: &ContextOutput) -> Result<()> {
    let text = if cli.json {
        output.to_json().context("failed to serialize output")?
    } else {
        output.document.clone()
    };

    match &cli.output {
        Some(path) => tokio::fs::write(path, text)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|()| stdout.flush())
                .context("failed to write to stdout")?;
        }
    }
    Ok(())
}

fn report(output: &ContextOutput) {
    for warning in &output.warnings {
        eprintln!("warning: {warning}");
    }
    if output.exceeds_threshold() {
        eprintln!("warning: {}", output.summary());
    } else {
        eprintln!("{}", output.summary());
    }
}
