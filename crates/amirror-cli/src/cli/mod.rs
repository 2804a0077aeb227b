//! CLI for the amirror archive mirroring tool.

mod commands;

use amirror_core::config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use commands::{run_check, run_checksum, run_list, run_update, UpdateOptions};

/// Exit code when the run finished but at least one entry failed.
pub const EXIT_PARTIAL_FAILURE: i32 = 2;

/// Top-level CLI for amirror.
#[derive(Debug, Parser)]
#[command(name = "amirror")]
#[command(about = "amirror: mirror a catalog of remote zip archives into a local directory", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every catalog entry and swap it into the destination directory.
    Update {
        /// Fetch up to N archives concurrently (default from config, 16). Use 1 for sequential.
        #[arg(long, value_name = "N")]
        jobs: Option<NonZeroUsize>,
        /// Destination root; each entry lands in DIR/<name>.
        #[arg(long, value_name = "DIR")]
        dest: Option<PathBuf>,
        /// Catalog file (`<name> <url>` per line). Defaults to the built-in plugin list.
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,
        /// Only update the named entry (repeatable).
        #[arg(long = "only", value_name = "NAME")]
        only: Vec<String>,
        /// Branch used for repository URLs (`<url>/archive/<branch>.zip`).
        #[arg(long, value_name = "BRANCH")]
        branch: Option<String>,
        /// Print results as JSON instead of one line per entry.
        #[arg(long)]
        json: bool,
    },

    /// Show catalog entries and the archive URL each resolves to.
    List {
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,
    },

    /// Validate a catalog without fetching anything.
    Check {
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,
    },

    /// Compute SHA-256 of a file (e.g. to compare with a reported archive digest).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    /// Parses arguments, runs the command and returns the process exit code.
    pub async fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();

        if let CliCommand::Checksum { path } = &cli.command {
            run_checksum(path)?;
            return Ok(0);
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Update {
                jobs,
                dest,
                catalog,
                only,
                branch,
                json,
            } => {
                let opts = UpdateOptions {
                    jobs: jobs.map(NonZeroUsize::get),
                    dest,
                    catalog,
                    only,
                    branch,
                    json,
                };
                let all_ok = run_update(&cfg, opts).await?;
                Ok(if all_ok { 0 } else { EXIT_PARTIAL_FAILURE })
            }
            CliCommand::List { catalog } => {
                run_list(&cfg, catalog.as_deref())?;
                Ok(0)
            }
            CliCommand::Check { catalog } => {
                run_check(&cfg, catalog.as_deref())?;
                Ok(0)
            }
            CliCommand::Checksum { .. } => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests;
