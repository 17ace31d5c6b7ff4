//! One download session, start to finish.
//!
//! Admission check, scratch setup, one blocking worker per range, the
//! progress monitor alongside them, and the merge once every worker is done.
//! Workers are never interrupted: a failing worker is reported after the
//! others have finished, and its scratch directory is left in place.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::SplitdlConfig;
use crate::download_target::DownloadTarget;
use crate::error::{CoreError, CoreResult};
use crate::fetch::RangeFetcher;
use crate::merge;
use crate::progress::{ProgressMonitor, ProgressSink, ProgressStats, POLL_INTERVAL};
use crate::segmenter;
use crate::space::{self, FreeSpaceProvider};

/// Per-session knobs, usually taken from [`SplitdlConfig`] plus CLI overrides.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub workers: usize,
    pub download_dir: Option<PathBuf>,
    pub scratch_base: Option<PathBuf>,
    pub poll_interval: Duration,
    pub reserve_chunk_space: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            download_dir: None,
            scratch_base: None,
            poll_interval: POLL_INTERVAL,
            reserve_chunk_space: true,
        }
    }
}

impl SessionOptions {
    pub fn from_config(cfg: &SplitdlConfig) -> Self {
        Self {
            workers: cfg.workers,
            download_dir: cfg.download_dir.clone(),
            scratch_base: cfg.scratch_base.clone(),
            poll_interval: cfg.poll_interval(),
            reserve_chunk_space: cfg.reserve_chunk_space,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub path: PathBuf,
    pub bytes: u64,
    pub workers: usize,
}

/// Worker count actually used: at least 1, and no more than one per byte.
pub fn effective_workers(requested: usize, total_size: u64) -> usize {
    if total_size == 0 {
        return 1;
    }
    let cap = usize::try_from(total_size).unwrap_or(usize::MAX);
    requested.clamp(1, cap)
}

/// Downloads `url` (of known `total_size`) through `fetcher` into the
/// destination described by `options`.
pub async fn run_session<P, S>(
    url: &str,
    total_size: u64,
    fetcher: Arc<dyn RangeFetcher>,
    space_provider: &P,
    options: &SessionOptions,
    mut sink: S,
) -> Result<SessionReport>
where
    P: FreeSpaceProvider + ?Sized,
    S: ProgressSink + 'static,
{
    let workers = effective_workers(options.workers, total_size);
    if workers != options.workers {
        tracing::debug!(requested = options.workers, workers, "adjusted worker count");
    }
    let target = DownloadTarget::from_url(
        url,
        options.download_dir.as_deref(),
        options.scratch_base.as_deref(),
        total_size,
        workers,
    );

    let chunk_size = segmenter::chunk_size_for(total_size, workers);
    let ranges = segmenter::plan_all(chunk_size, workers, total_size);
    let extra = if options.reserve_chunk_space && total_size > 0 {
        ranges.iter().map(|r| r.len()).max().unwrap_or(0)
    } else {
        0
    };
    space::ensure_free(space_provider, total_size, extra)?;

    if total_size == 0 {
        File::create(target.full_path()).map_err(|source| CoreError::FinalFileCreate {
            path: target.full_path().to_path_buf(),
            source,
        })?;
        sink.finish(ProgressStats {
            bytes_done: 0,
            total_bytes: 0,
            done: true,
        });
        return Ok(SessionReport {
            path: target.full_path().to_path_buf(),
            bytes: 0,
            workers,
        });
    }

    let arena = target.scratch();
    arena.create()?;
    tracing::info!(
        url,
        dest = %target.full_path().display(),
        scratch = %arena.dir().display(),
        total_size,
        workers,
        chunk_size,
        "starting download"
    );

    let cancel = CancellationToken::new();
    let monitor = ProgressMonitor::for_target(&target).with_interval(options.poll_interval);
    let monitor_handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move { monitor.run(&cancel, &mut sink).await })
    };

    let mut handles = Vec::with_capacity(ranges.len());
    for range in ranges {
        let fetcher = Arc::clone(&fetcher);
        let url = url.to_string();
        let dest = arena.chunk_path(range.worker());
        handles.push(tokio::task::spawn_blocking(move || -> Result<u64> {
            let expected = range.clamped_len(total_size);
            let written = fetcher
                .fetch(&url, &range, total_size, &dest)
                .with_context(|| format!("worker {} failed", range.worker()))?;
            if written != expected {
                anyhow::bail!(
                    "worker {} wrote {} bytes, expected {}",
                    range.worker(),
                    written,
                    expected
                );
            }
            Ok(written)
        }));
    }

    let mut first_error: Option<anyhow::Error> = None;
    for handle in handles {
        let outcome = match handle.await {
            Ok(res) => res,
            Err(join) => Err(anyhow::Error::new(join).context("worker task aborted")),
        };
        if let Err(e) = outcome {
            tracing::warn!("{:#}", e);
            first_error.get_or_insert(e);
        }
    }

    if let Some(e) = first_error {
        cancel.cancel();
        report_monitor_outcome(monitor_handle.await);
        return Err(e);
    }

    // Every chunk holds its exact byte count now, so the monitor sees the full
    // total on its next poll; the timeout only covers a stuck size query.
    let shutdown = options.poll_interval * 10 + Duration::from_secs(1);
    finish_monitor(monitor_handle, cancel, shutdown).await;

    let summary = tokio::task::spawn_blocking(move || merge::merge_chunks(&target))
        .await
        .context("merge task aborted")??;
    if summary.bytes != total_size {
        anyhow::bail!(
            "merged file {} has {} bytes, expected {}",
            summary.path.display(),
            summary.bytes,
            total_size
        );
    }

    Ok(SessionReport {
        path: summary.path,
        bytes: summary.bytes,
        workers,
    })
}

/// Waits up to `limit` for the monitor to report completion, then cancels it.
async fn finish_monitor(
    mut handle: JoinHandle<CoreResult<()>>,
    cancel: CancellationToken,
    limit: Duration,
) {
    let outcome = match tokio::time::timeout(limit, &mut handle).await {
        Ok(res) => res,
        Err(_) => {
            cancel.cancel();
            handle.await
        }
    };
    report_monitor_outcome(outcome);
}

/// Monitor failures only affect the progress display; they never fail the session.
fn report_monitor_outcome(outcome: Result<CoreResult<()>, tokio::task::JoinError>) {
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("progress monitor stopped: {:#}", anyhow::Error::new(e)),
        Err(e) => tracing::warn!("progress monitor task failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_workers_bounds() {
        assert_eq!(effective_workers(8, 1000), 8);
        assert_eq!(effective_workers(0, 1000), 1);
        assert_eq!(effective_workers(8, 3), 3);
        assert_eq!(effective_workers(8, 0), 1);
    }

    #[test]
    fn options_from_config() {
        let cfg = SplitdlConfig {
            workers: 3,
            poll_interval_ms: 250,
            reserve_chunk_space: false,
            ..SplitdlConfig::default()
        };
        let opts = SessionOptions::from_config(&cfg);
        assert_eq!(opts.workers, 3);
        assert_eq!(opts.poll_interval, Duration::from_millis(250));
        assert!(!opts.reserve_chunk_space);
    }
}
