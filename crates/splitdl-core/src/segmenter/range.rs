//! Per-worker byte ranges.

/// Inclusive byte range `[low, high]` assigned to one worker.
///
/// Produced only by [`plan`]; there are no setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    low: u64,
    high: u64,
    worker: usize,
}

impl Range {
    pub fn low(&self) -> u64 {
        self.low
    }

    pub fn high(&self) -> u64 {
        self.high
    }

    pub fn worker(&self) -> usize {
        self.worker
    }

    /// Number of bytes covered, counting both bounds.
    pub fn len(&self) -> u64 {
        if self.high < self.low {
            0
        } else {
            (self.high - self.low).saturating_add(1)
        }
    }

    /// Bytes a server actually returns for this range of a `total_size` file,
    /// with an end past the last byte clamped.
    pub fn clamped_len(&self, total_size: u64) -> u64 {
        self.len().min(total_size.saturating_sub(self.low))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// HTTP Range header value, bounds sent exactly as planned: `bytes=low-high`.
    pub fn range_header_value(&self) -> String {
        format!("bytes={}-{}", self.low, self.high)
    }
}

/// Plans the range for `worker_index` out of `worker_count` workers.
///
/// Every worker but the last covers exactly `chunk_size` bytes starting at
/// `chunk_size * worker_index`. The last worker ends at `total_size` itself,
/// not `total_size - 1`; range consumers must tolerate an end one past the
/// final offset. No consistency check is made between `chunk_size`,
/// `worker_count` and `total_size`.
pub fn plan(worker_index: usize, chunk_size: u64, worker_count: usize, total_size: u64) -> Range {
    let low = chunk_size.saturating_mul(worker_index as u64);
    let high = if worker_index.saturating_add(1) == worker_count {
        total_size
    } else {
        low.saturating_add(chunk_size).saturating_sub(1)
    };
    Range {
        low,
        high,
        worker: worker_index,
    }
}

/// Ranges for every worker in ascending index order.
pub fn plan_all(chunk_size: u64, worker_count: usize, total_size: u64) -> Vec<Range> {
    (0..worker_count)
        .map(|i| plan(i, chunk_size, worker_count, total_size))
        .collect()
}

/// Chunk size for splitting `total_size` across `worker_count` workers
/// (integer division; the last worker absorbs the remainder).
pub fn chunk_size_for(total_size: u64, worker_count: usize) -> u64 {
    if worker_count == 0 {
        return total_size;
    }
    total_size / worker_count as u64
}
