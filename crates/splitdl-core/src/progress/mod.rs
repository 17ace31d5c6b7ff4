//! Download progress estimated from bytes on disk.
//!
//! The monitor never talks to the workers; it sums file sizes in the scratch
//! directory on a fixed cadence. This is only accurate while chunk files are
//! written append-only, which is what the fetcher does, and it cannot tell
//! flushed bytes from durable ones. Good enough for a progress bar.

mod stats;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::download_target::DownloadTarget;
use crate::error::{CoreError, CoreResult};

pub use stats::{ProgressSink, ProgressStats};

/// Default time between two directory walks.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Polls a scratch directory until its contents reach `total_size` bytes.
#[derive(Debug, Clone)]
pub struct ProgressMonitor {
    dir: PathBuf,
    total_size: u64,
    interval: Duration,
}

impl ProgressMonitor {
    pub fn new(dir: impl Into<PathBuf>, total_size: u64) -> Self {
        ProgressMonitor {
            dir: dir.into(),
            total_size,
            interval: POLL_INTERVAL,
        }
    }

    pub fn for_target(target: &DownloadTarget) -> Self {
        Self::new(target.scratch_dir(), target.total_size())
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs until the directory holds at least `total_size` bytes or `cancel`
    /// fires.
    ///
    /// Cancellation is checked before every walk and during the sleep between
    /// walks, and returns `Ok(())`. Reported values never decrease and never
    /// exceed `total_size`; the final report on completion has `done` set.
    /// A failed walk is returned as [`CoreError::ProgressRead`] without retry.
    pub async fn run<S: ProgressSink>(
        &self,
        cancel: &CancellationToken,
        sink: &mut S,
    ) -> CoreResult<()> {
        let mut last = 0u64;
        loop {
            if cancel.is_cancelled() {
                tracing::debug!(dir = %self.dir.display(), "progress monitor cancelled");
                return Ok(());
            }

            let measured = self.measure().await?;
            if measured >= self.total_size {
                sink.finish(ProgressStats {
                    bytes_done: self.total_size,
                    total_bytes: self.total_size,
                    done: true,
                });
                tracing::debug!(dir = %self.dir.display(), measured, "progress complete");
                return Ok(());
            }

            last = last.max(measured);
            sink.report(ProgressStats {
                bytes_done: last,
                total_bytes: self.total_size,
                done: false,
            });

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(dir = %self.dir.display(), "progress monitor cancelled");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    async fn measure(&self) -> CoreResult<u64> {
        let dir = self.dir.clone();
        let walked = tokio::task::spawn_blocking(move || dir_size(&dir))
            .await
            .unwrap_or_else(|e| Err(io::Error::new(io::ErrorKind::Other, e)));
        walked.map_err(|source| CoreError::ProgressRead {
            dir: self.dir.clone(),
            source,
        })
    }
}

/// Sum of the sizes of all non-directory entries under `dir`, recursively.
/// Symlinks are not followed.
pub fn dir_size(dir: &Path) -> io::Result<u64> {
    let meta = fs::symlink_metadata(dir)?;
    if !meta.is_dir() {
        return Ok(meta.len());
    }
    let mut total = 0u64;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let meta = fs::symlink_metadata(entry.path())?;
        if meta.is_dir() {
            total += dir_size(&entry.path())?;
        } else {
            total += meta.len();
        }
    }
    Ok(total)
}
