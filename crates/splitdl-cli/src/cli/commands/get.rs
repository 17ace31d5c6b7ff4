//! `splitdl get <url>` – probe, download in ranges, merge.

use anyhow::{Context, Result};
use splitdl_core::config::SplitdlConfig;
use splitdl_core::fetch::{self, CurlFetcher};
use splitdl_core::progress::ProgressStats;
use splitdl_core::session::{self, SessionOptions};
use splitdl_core::space::SystemVolume;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

const PRINT_INTERVAL: Duration = Duration::from_millis(500);

pub async fn run_get(
    cfg: &SplitdlConfig,
    url: &str,
    dir: Option<PathBuf>,
    workers: Option<usize>,
) -> Result<()> {
    let probe_url = url.to_string();
    let head = tokio::task::spawn_blocking(move || fetch::probe(&probe_url))
        .await
        .context("probe task aborted")??;
    let total_size = head
        .content_length
        .ok_or_else(|| anyhow::anyhow!("server did not send Content-Length"))?;

    let mut options = SessionOptions::from_config(cfg);
    if let Some(dir) = dir {
        options.download_dir = Some(dir);
    }
    if let Some(n) = workers {
        options.workers = n;
    }
    if !head.accept_ranges && options.workers > 1 {
        tracing::warn!("server does not advertise byte ranges; using a single worker");
        println!("Server does not support ranges, downloading with one worker.");
        options.workers = 1;
    }

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ProgressStats>(16);
    let printer = tokio::spawn(async move {
        let started = Instant::now();
        let mut last_print: Option<Instant> = None;
        while let Some(stats) = progress_rx.recv().await {
            let now = Instant::now();
            let due = last_print.map_or(true, |t| now.duration_since(t) >= PRINT_INTERVAL);
            if due || stats.done {
                print_progress(&stats, started.elapsed());
                last_print = Some(now);
            }
        }
        println!();
    });

    let fetcher = Arc::new(CurlFetcher::new(Duration::from_secs(cfg.connect_timeout_secs)));
    let result = session::run_session(
        url,
        total_size,
        fetcher,
        &SystemVolume::new(),
        &options,
        progress_tx,
    )
    .await;
    let _ = printer.await;

    let report = result?;
    println!(
        "Complete: {} ({} bytes, {} workers)",
        report.path.display(),
        report.bytes,
        report.workers
    );
    Ok(())
}

fn print_progress(stats: &ProgressStats, elapsed: Duration) {
    let done_mib = stats.bytes_done as f64 / 1_048_576.0;
    let total_mib = stats.total_bytes as f64 / 1_048_576.0;
    let secs = elapsed.as_secs_f64();
    let rate_mib = if secs > 0.0 { done_mib / secs } else { 0.0 };
    print!(
        "\r  {:.1} / {:.1} MiB ({:.1}%)  {:.2} MiB/s  ",
        done_mib,
        total_mib,
        stats.fraction() * 100.0,
        rate_mib
    );
    let _ = std::io::stdout().flush();
}
