//! CLI definition.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use autolog_config::{ConfigError, Options, Platform, find_and_load_config_from, load_config};
use autolog_core::{Engine, format_bytes};
use autolog_git::GitCli;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Extract an enriched commit history from git as JSON.
#[derive(Debug, Parser)]
#[command(name = "autolog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Options file (default: autolog.toml in the repository or a parent)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Branch to read instead of HEAD and the included branches
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Hosting platform, overriding detection from the remote
    #[arg(long, env = "AUTOLOG_PLATFORM")]
    pub platform: Option<Platform>,

    /// Repository directory (default: current directory)
    #[arg(short = 'C', long)]
    pub repo: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Runs the CLI command.
    pub fn run(self) -> Result<()> {
        let rt = tokio::runtime::Runtime::new().context("failed to create async runtime")?;
        rt.block_on(self.run_async())
    }

    async fn run_async(self) -> Result<()> {
        let mut options = self.load_options()?;
        if let Some(platform) = self.platform {
            options.platform = Some(platform);
        }

        let mut git = GitCli::new();
        if let Some(repo) = &self.repo {
            git = git.with_work_dir(repo);
        }
        let engine = Engine::new(Arc::new(git), options.remote.clone(), &options)
            .context("invalid options")?;

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });

        let progress = |bytes: usize| debug!(loaded = %format_bytes(bytes), "fetching commits");
        let commits = match self.branch.as_deref() {
            Some(branch) => engine.fetch_commits(Some(branch), Some(&progress), &cancel).await,
            None => engine.fetch_all_commits(Some(&progress), &cancel).await,
        }
        .context("failed to fetch commits")?;
        info!(count = commits.len(), "extracted commits");

        let json = if self.pretty {
            serde_json::to_string_pretty(&commits)?
        } else {
            serde_json::to_string(&commits)?
        };
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{json}")?;
        Ok(())
    }

    fn load_options(&self) -> Result<Options> {
        if let Some(path) = &self.config {
            return load_config(path)
                .with_context(|| format!("failed to load options from {}", path.display()));
        }

        let start_dir = match &self.repo {
            Some(repo) => repo.clone(),
            None => std::env::current_dir()?,
        };
        match find_and_load_config_from(&start_dir) {
            Ok(options) => Ok(options),
            Err(ConfigError::NotFound(_)) => {
                debug!("no options file found, using defaults");
                Ok(Options::default())
            }
            Err(err) => Err(err).context("failed to load options"),
        }
    }
}
