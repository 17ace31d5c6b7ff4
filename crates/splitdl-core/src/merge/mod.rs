//! Final assembly: concatenate chunk files in worker index order.
//!
//! `Start -> (open_i -> copy_i -> delete_i) for i in 0..N -> remove scratch dir -> Done`.
//! Any step failing ends the merge right there. Nothing is rolled back: the
//! destination keeps the chunks already appended, and consumed chunk files
//! stay deleted.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::download_target::DownloadTarget;
use crate::error::{CoreError, CoreResult};
use crate::progress::{ProgressSink, ProgressStats};
use crate::scratch::ScratchArena;

/// Outcome of a completed merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub path: PathBuf,
    pub chunks: usize,
    pub bytes: u64,
}

/// Merges all chunks of `target` into its destination path and removes its
/// scratch directory.
///
/// Must only be called once every worker has finished; chunk presence is not
/// checked up front.
pub fn merge_chunks(target: &DownloadTarget) -> CoreResult<MergeSummary> {
    merge_arena(&target.scratch(), target.full_path())
}

/// As [`merge_chunks`], reporting bytes appended against `target.total_size()`.
pub fn merge_chunks_with_progress<S: ProgressSink + ?Sized>(
    target: &DownloadTarget,
    sink: &mut S,
) -> CoreResult<MergeSummary> {
    merge_arena_with_progress(&target.scratch(), target.full_path(), target.total_size(), sink)
}

/// Merges `arena`'s chunks into `dest` (created or truncated).
pub fn merge_arena(arena: &ScratchArena, dest: &Path) -> CoreResult<MergeSummary> {
    merge_arena_with_progress(arena, dest, 0, &mut NoProgress)
}

struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _stats: ProgressStats) {}
}

/// Merges `arena`'s chunks into `dest`, sending one sample to `sink` after
/// each appended chunk and a `done` sample once the scratch dir is gone.
///
/// `total_bytes` is only used for the samples; pass 0 when unknown and the
/// running byte count stands in for it.
pub fn merge_arena_with_progress<S: ProgressSink + ?Sized>(
    arena: &ScratchArena,
    dest: &Path,
    total_bytes: u64,
    sink: &mut S,
) -> CoreResult<MergeSummary> {
    tracing::info!(
        dest = %dest.display(),
        chunks = arena.worker_count(),
        "binding chunk files"
    );

    let mut out = File::create(dest).map_err(|source| CoreError::FinalFileCreate {
        path: dest.to_path_buf(),
        source,
    })?;

    let mut bytes = 0u64;
    for (index, path) in arena.chunk_paths() {
        bytes += append_chunk(&mut out, index, &path)?;
        // Delete failures are fatal: a retry would see a stale chunk.
        fs::remove_file(&path).map_err(|source| CoreError::ChunkDelete {
            index,
            path: path.clone(),
            source,
        })?;
        sink.report(ProgressStats {
            bytes_done: bytes,
            total_bytes: total_bytes.max(bytes),
            done: false,
        });
    }
    drop(out);

    arena.remove()?;
    sink.finish(ProgressStats {
        bytes_done: bytes,
        total_bytes: total_bytes.max(bytes),
        done: true,
    });

    tracing::info!(dest = %dest.display(), bytes, "merge complete");
    Ok(MergeSummary {
        path: dest.to_path_buf(),
        chunks: arena.worker_count(),
        bytes,
    })
}

/// Streams one chunk into `out`; the chunk handle is closed on return.
fn append_chunk(out: &mut File, index: usize, path: &Path) -> CoreResult<u64> {
    let mut chunk = File::open(path).map_err(|source| CoreError::ChunkOpen {
        index,
        path: path.to_path_buf(),
        source,
    })?;
    let copied = io::copy(&mut chunk, out).map_err(|source| CoreError::ChunkCopy {
        index,
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(index, copied, "chunk appended");
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(index: usize, len: usize) -> Vec<u8> {
        (0..len).map(|b| (b as u8).wrapping_mul(31).wrapping_add(index as u8)).collect()
    }

    fn setup(dir: &Path, worker_count: usize, skip: Option<usize>) -> (DownloadTarget, Vec<Vec<u8>>) {
        let target = DownloadTarget::new("out.bin", Some(dir), Some(dir), 0, worker_count);
        let arena = target.scratch();
        arena.create().unwrap();
        let mut contents = Vec::new();
        for (i, path) in arena.chunk_paths() {
            let data = pattern(i, 100 + i * 17);
            if Some(i) != skip {
                fs::write(&path, &data).unwrap();
            }
            contents.push(data);
        }
        (target, contents)
    }

    #[test]
    fn merge_concatenates_in_index_order_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let (target, contents) = setup(dir.path(), 5, None);

        let summary = merge_chunks(&target).unwrap();

        let expected: Vec<u8> = contents.concat();
        assert_eq!(fs::read(target.full_path()).unwrap(), expected);
        assert_eq!(summary.bytes, expected.len() as u64);
        assert_eq!(summary.chunks, 5);
        assert_eq!(summary.path, target.full_path());
        for (_, path) in target.scratch().chunk_paths() {
            assert!(!path.exists());
        }
        assert!(!target.scratch_dir().exists());
    }

    #[test]
    fn merge_reports_cumulative_bytes_per_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let (target, contents) = setup(dir.path(), 3, None);
        let total: u64 = contents.iter().map(|c| c.len() as u64).sum();

        let mut reports: Vec<ProgressStats> = Vec::new();
        let summary =
            merge_arena_with_progress(&target.scratch(), target.full_path(), total, &mut reports).unwrap();

        assert_eq!(summary.bytes, total);
        let done: Vec<u64> = reports.iter().map(|r| r.bytes_done).collect();
        assert_eq!(done, vec![100, 100 + 117, total, total]);
        assert!(reports.iter().all(|r| r.total_bytes == total));
        assert!(reports[..3].iter().all(|r| !r.done));
        assert!(reports[3].done);
    }

    #[test]
    fn merge_progress_stops_without_done_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (target, _) = setup(dir.path(), 3, Some(1));

        let mut reports: Vec<ProgressStats> = Vec::new();
        let err = merge_arena_with_progress(&target.scratch(), target.full_path(), 0, &mut reports)
            .unwrap_err();
        assert_eq!(err.chunk_index(), Some(1));
        assert_eq!(
            reports,
            vec![ProgressStats {
                bytes_done: 100,
                total_bytes: 100,
                done: false
            }]
        );
    }

    #[test]
    fn missing_chunk_leaves_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let (target, contents) = setup(dir.path(), 4, Some(2));

        let err = merge_chunks(&target).unwrap_err();
        assert!(matches!(err, CoreError::ChunkOpen { index: 2, .. }));
        assert_eq!(err.chunk_index(), Some(2));

        // Chunks 0 and 1 were appended and consumed; nothing was rolled back.
        let expected: Vec<u8> = contents[..2].concat();
        assert_eq!(fs::read(target.full_path()).unwrap(), expected);
        let arena = target.scratch();
        assert!(!arena.chunk_path(0).exists());
        assert!(!arena.chunk_path(1).exists());
        assert!(arena.chunk_path(3).exists());
        assert!(target.scratch_dir().exists());
    }

    #[test]
    fn existing_destination_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let (target, contents) = setup(dir.path(), 2, None);
        fs::write(target.full_path(), vec![0xAA; 4096]).unwrap();

        merge_chunks(&target).unwrap();
        assert_eq!(fs::read(target.full_path()).unwrap(), contents.concat());
    }

    #[test]
    fn incidental_files_in_scratch_dir_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        let (target, _) = setup(dir.path(), 1, None);
        fs::write(target.scratch_dir().join(".DS_Store"), b"x").unwrap();

        merge_chunks(&target).unwrap();
        assert!(!target.scratch_dir().exists());
    }

    #[test]
    fn uncreatable_destination_fails_before_touching_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let arena = ScratchArena::new(dir.path().join("_f.1"), "f", 1);
        arena.create().unwrap();
        fs::write(arena.chunk_path(0), b"data").unwrap();

        let dest = dir.path().join("no-such-dir").join("f");
        let err = merge_arena(&arena, &dest).unwrap_err();
        assert!(matches!(err, CoreError::FinalFileCreate { .. }));
        assert!(arena.chunk_path(0).exists());
    }
}
