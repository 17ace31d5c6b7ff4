//! CLI for the splitdl segmented downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use splitdl_core::config;
use std::path::PathBuf;

use commands::{run_get, run_merge, run_plan, run_space};

/// Top-level CLI for splitdl.
#[derive(Debug, Parser)]
#[command(name = "splitdl")]
#[command(about = "splitdl: segmented file downloader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a URL with several concurrent range workers.
    Get {
        /// Direct HTTP/HTTPS URL to download.
        url: String,
        /// Destination directory (default: config `download_dir`, else current directory).
        #[arg(long, short = 'd', value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Number of range workers (default: config `workers`).
        #[arg(long, short = 'p', value_name = "N")]
        workers: Option<usize>,
    },

    /// Print the byte range each worker would fetch for a file of SIZE bytes.
    Plan {
        /// Total file size in bytes.
        total_size: u64,
        /// Number of range workers (default: config `workers`).
        #[arg(long, short = 'p', value_name = "N")]
        workers: Option<usize>,
    },

    /// Merge chunk files left in a scratch directory by an earlier `get`.
    Merge {
        /// File name the chunks belong to (as used in `_<name>.<workers>`).
        name: String,
        /// Worker count of the original download.
        #[arg(long, short = 'p', value_name = "N")]
        workers: usize,
        /// Destination directory for the merged file.
        #[arg(long, short = 'd', value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Directory containing the scratch directory.
        #[arg(long, value_name = "DIR")]
        scratch_base: Option<PathBuf>,
    },

    /// Check whether the system volume has room for SIZE bytes (plus EXTRA).
    Space {
        /// Bytes the download needs.
        size: u64,
        /// Additional bytes held while in flight.
        #[arg(long, default_value = "0", value_name = "EXTRA")]
        extra: u64,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get { url, dir, workers } => run_get(&cfg, &url, dir, workers).await?,
            CliCommand::Plan {
                total_size,
                workers,
            } => run_plan(total_size, workers.unwrap_or(cfg.workers)),
            CliCommand::Merge {
                name,
                workers,
                dir,
                scratch_base,
            } => {
                let dir = dir.or_else(|| cfg.download_dir.clone());
                let scratch_base = scratch_base.or_else(|| cfg.scratch_base.clone());
                run_merge(&name, workers, dir, scratch_base).await?;
            }
            CliCommand::Space { size, extra } => run_space(size, extra)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
