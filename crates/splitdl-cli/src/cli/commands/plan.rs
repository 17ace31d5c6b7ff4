//! `splitdl plan <size>` – show the per-worker ranges.

use splitdl_core::segmenter;
use splitdl_core::session::effective_workers;

pub fn run_plan(total_size: u64, workers: usize) {
    for line in plan_lines(total_size, workers) {
        println!("{line}");
    }
}

fn plan_lines(total_size: u64, workers: usize) -> Vec<String> {
    let workers = effective_workers(workers, total_size);
    let chunk_size = segmenter::chunk_size_for(total_size, workers);
    let mut lines = vec![format!(
        "{} bytes, {} workers, chunk size {}",
        total_size, workers, chunk_size
    )];
    for r in segmenter::plan_all(chunk_size, workers, total_size) {
        lines.push(format!(
            "  worker {:>3}: bytes {}-{} ({} bytes)",
            r.worker(),
            r.low(),
            r.high(),
            r.len()
        ));
    }
    lines
}
