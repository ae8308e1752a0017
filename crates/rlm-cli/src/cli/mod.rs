//! CLI for the RLM rule list mirror.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rlm_core::config::{self, RlmConfig};
use std::path::PathBuf;

use commands::{run_plan, run_status, run_sync_cmd};

/// Top-level CLI for the RLM rule list mirror.
#[derive(Debug, Parser)]
#[command(name = "rlm")]
#[command(about = "RLM: mirror remote rule lists into a local directory", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Per-run overrides of the config file; unset flags keep the configured value.
#[derive(Debug, Default, Args)]
pub struct SyncOptions {
    /// Source list file (one URL per line, `#` comments).
    #[arg(long, value_name = "FILE")]
    pub source_list: Option<PathBuf>,

    /// Manifest file tracking URL -> filename/hash.
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Directory holding the mirrored rule files.
    #[arg(long, value_name = "DIR")]
    pub rules_dir: Option<PathBuf>,

    /// Base location for the generated download-URL list.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Fetch up to N sources concurrently.
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Per-fetch timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl SyncOptions {
    pub fn apply(&self, cfg: &mut RlmConfig) {
        if let Some(p) = &self.source_list {
            cfg.source_list = p.clone();
        }
        if let Some(p) = &self.manifest {
            cfg.manifest = p.clone();
        }
        if let Some(p) = &self.rules_dir {
            cfg.rules_dir = p.clone();
        }
        if let Some(u) = &self.base_url {
            cfg.base_url = Some(u.clone());
        }
        if let Some(n) = self.jobs {
            cfg.jobs = n;
        }
        if let Some(secs) = self.timeout {
            cfg.fetch_timeout_secs = secs;
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Reconcile the source list against the mirror: fetch, update, delete.
    Sync {
        #[command(flatten)]
        options: SyncOptions,

        /// Exit nonzero if any source fails to fetch.
        #[arg(long)]
        strict: bool,

        /// Print the run report as JSON instead of the text summary.
        #[arg(long)]
        json: bool,
    },

    /// Dry run: show what a sync would add, keep, and remove. No network.
    Plan {
        #[command(flatten)]
        options: SyncOptions,
    },

    /// Show the tracked sources from the manifest.
    Status {
        /// Manifest file to read.
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Sync {
                options,
                strict,
                json,
            } => {
                options.apply(&mut cfg);
                if strict {
                    cfg.strict = true;
                }
                run_sync_cmd(&cfg, json).await?;
            }
            CliCommand::Plan { options } => {
                options.apply(&mut cfg);
                run_plan(&cfg)?;
            }
            CliCommand::Status { manifest } => {
                if let Some(p) = manifest {
                    cfg.manifest = p;
                }
                run_status(&cfg)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
