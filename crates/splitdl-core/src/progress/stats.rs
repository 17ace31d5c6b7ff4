//! Progress snapshots and where they go.

use tokio::sync::mpsc::{self, error::TrySendError};

/// One progress sample for the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStats {
    /// Bytes on disk so far, clamped to `total_bytes`.
    pub bytes_done: u64,
    /// Expected size of the final file.
    pub total_bytes: u64,
    /// Set on the last sample, once every byte is present.
    pub done: bool,
}

impl ProgressStats {
    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.0;
        }
        (self.bytes_done as f64 / self.total_bytes as f64).min(1.0)
    }
}

/// Receiver of progress samples.
pub trait ProgressSink: Send {
    fn report(&mut self, stats: ProgressStats);

    /// Delivers the last sample of a run. Sinks that may drop samples must
    /// not drop this one.
    fn finish(&mut self, stats: ProgressStats) {
        self.report(stats);
    }
}

/// Intermediate samples are dropped when the channel is full or closed; the
/// monitor never waits on the UI. The final sample is queued behind them.
impl ProgressSink for mpsc::Sender<ProgressStats> {
    fn report(&mut self, stats: ProgressStats) {
        let _ = self.try_send(stats);
    }

    fn finish(&mut self, stats: ProgressStats) {
        let stats = match self.try_send(stats) {
            Err(TrySendError::Full(stats)) => stats,
            Ok(()) | Err(TrySendError::Closed(_)) => return,
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let tx = self.clone();
                handle.spawn(async move {
                    let _ = tx.send(stats).await;
                });
            }
            Err(_) => {
                let _ = self.blocking_send(stats);
            }
        }
    }
}

impl ProgressSink for Vec<ProgressStats> {
    fn report(&mut self, stats: ProgressStats) {
        self.push(stats);
    }
}
