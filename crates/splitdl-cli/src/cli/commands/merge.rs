//! `splitdl merge <name> -p N` – bind chunk files left in a scratch directory.

use anyhow::{Context, Result};
use splitdl_core::download_target::DownloadTarget;
use splitdl_core::merge;
use splitdl_core::progress::{self, ProgressSink, ProgressStats};
use std::path::PathBuf;

/// Prints one line per appended chunk.
struct MergePrinter;

impl ProgressSink for MergePrinter {
    fn report(&mut self, stats: ProgressStats) {
        if !stats.done {
            println!(
                "  {}/{} bytes ({:.1}%)",
                stats.bytes_done,
                stats.total_bytes,
                stats.fraction() * 100.0
            );
        }
    }
}

pub async fn run_merge(
    name: &str,
    workers: usize,
    dir: Option<PathBuf>,
    scratch_base: Option<PathBuf>,
) -> Result<()> {
    let existing = DownloadTarget::new(name, dir.as_deref(), scratch_base.as_deref(), 0, workers);
    let scratch_dir = existing.scratch_dir().to_path_buf();
    if !scratch_dir.is_dir() {
        anyhow::bail!("no scratch directory at {}", scratch_dir.display());
    }
    let total = progress::dir_size(&scratch_dir)
        .with_context(|| format!("failed to size {}", scratch_dir.display()))?;
    let target = DownloadTarget::new(name, dir.as_deref(), scratch_base.as_deref(), total, workers);
    println!("Binding {} chunks from {}...", workers, scratch_dir.display());

    let summary = tokio::task::spawn_blocking(move || {
        merge::merge_chunks_with_progress(&target, &mut MergePrinter)
    })
    .await
    .context("merge task aborted")??;
    println!("Complete: {} ({} bytes)", summary.path.display(), summary.bytes);
    Ok(())
}
