//! Range workers: the fetch side that fills the scratch directory.
//!
//! The core only depends on [`RangeFetcher`]; [`CurlFetcher`] is the
//! libcurl-backed implementation the CLI uses.

mod head;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use crate::segmenter::Range;

pub use head::{probe, HeadInfo};

/// Fetches one byte range into a chunk file.
///
/// Implementations create `dest` fresh and only ever append to it, which is
/// what the progress monitor relies on. `total_size` is the size of the whole
/// file, so the range end can be clamped to it. Returns the number of bytes
/// written, which must be `range.clamped_len(total_size)`.
pub trait RangeFetcher: Send + Sync {
    fn fetch(&self, url: &str, range: &Range, total_size: u64, dest: &Path) -> Result<u64>;
}

/// Range GET over libcurl, one blocking transfer per call.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    connect_timeout: Duration,
}

impl CurlFetcher {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl RangeFetcher for CurlFetcher {
    fn fetch(&self, url: &str, range: &Range, total_size: u64, dest: &Path) -> Result<u64> {
        let mut file = File::create(dest)
            .with_context(|| format!("failed to create chunk file {}", dest.display()))?;

        let mut easy = curl::easy::Easy::new();
        easy.url(url).context("invalid URL")?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        // Abort if throughput stays below 1 KiB/s for 60s instead of a hard wall-clock limit.
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(Duration::from_secs(60))?;
        // Bounds are sent as planned; servers clamp an end past the last byte.
        easy.range(&format!("{}-{}", range.low(), range.high()))?;

        let mut written = 0u64;
        let mut write_error: Option<io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match file.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    write_error = Some(e);
                    Ok(0)
                }
            })?;
            transfer.perform()
        };

        if let Err(e) = performed {
            if let Some(io_err) = write_error {
                return Err(anyhow::Error::new(io_err)
                    .context(format!("failed to write chunk file {}", dest.display())));
            }
            return Err(e).with_context(|| format!("GET {} ({}) failed", url, range.range_header_value()));
        }

        let code = easy.response_code().context("no response code")?;
        let expected = range.clamped_len(total_size);
        // A plain 200 is only the right bytes when the range is the whole file.
        let whole_file = range.low() == 0 && expected == total_size;
        if code != 206 && !(code == 200 && whole_file) {
            anyhow::bail!("GET {} ({}) returned HTTP {}", url, range.range_header_value(), code);
        }
        if written != expected {
            anyhow::bail!(
                "partial transfer for {}: expected {} bytes, got {}",
                range.range_header_value(),
                expected,
                written
            );
        }

        tracing::debug!(worker = range.worker(), written, "range fetched");
        Ok(written)
    }
}
