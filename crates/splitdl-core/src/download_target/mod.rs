//! Identity of the file being assembled.
//!
//! A [`DownloadTarget`] is built once per session and consulted by every
//! other phase: the planner reads its size, the space guard its size, the
//! monitor its scratch directory, the merger all of it.

mod naming;

use std::path::{Path, PathBuf};

use crate::scratch::ScratchArena;

pub use naming::{name_from_url, unique_file_name};

/// Name used when the URL carries no usable path segment.
pub const DEFAULT_NAME: &str = "download.bin";

#[derive(Debug, Clone)]
pub struct DownloadTarget {
    name: String,
    full_path: PathBuf,
    scratch_dir: PathBuf,
    total_size: u64,
    worker_count: usize,
}

impl DownloadTarget {
    /// Builds a target for an already-chosen `name`. No collision check is made.
    pub fn new(
        name: impl Into<String>,
        directory: Option<&Path>,
        scratch_base: Option<&Path>,
        total_size: u64,
        worker_count: usize,
    ) -> Self {
        let name = name.into();
        DownloadTarget {
            full_path: full_path_for(directory, &name),
            scratch_dir: scratch_dir_for(scratch_base, &name, worker_count),
            name,
            total_size,
            worker_count,
        }
    }

    /// Derives the name from `url` and appends `-1`, `-2`, ... until it does
    /// not collide with an existing file in `directory`.
    ///
    /// The existence check and the later file creation are not atomic; only
    /// one invocation is expected to target a directory at a time.
    pub fn from_url(
        url: &str,
        directory: Option<&Path>,
        scratch_base: Option<&Path>,
        total_size: u64,
        worker_count: usize,
    ) -> Self {
        let original = name_from_url(url).unwrap_or_else(|| DEFAULT_NAME.to_string());
        let name = unique_file_name(directory, &original);
        if name != original {
            tracing::debug!(original = %original, name = %name, "renamed to avoid collision");
        }
        Self::new(name, directory, scratch_base, total_size, worker_count)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Chunk file layout inside this target's scratch directory.
    pub fn scratch(&self) -> ScratchArena {
        ScratchArena::new(&self.scratch_dir, &self.name, self.worker_count)
    }
}

/// `directory/name`, or just `name` when no (or an empty) directory is given.
pub fn full_path_for(directory: Option<&Path>, name: &str) -> PathBuf {
    match directory {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(name),
        _ => PathBuf::from(name),
    }
}

/// `_<name>.<worker_count>`, optionally under `base`.
pub fn scratch_dir_for(base: Option<&Path>, name: &str, worker_count: usize) -> PathBuf {
    let leaf = format!("_{}.{}", name, worker_count);
    match base {
        Some(base) if !base.as_os_str().is_empty() => base.join(leaf),
        _ => PathBuf::from(leaf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_path_with_and_without_directory() {
        assert_eq!(
            full_path_for(Some(Path::new("/tmp/out")), "a.iso"),
            PathBuf::from("/tmp/out/a.iso")
        );
        assert_eq!(full_path_for(None, "a.iso"), PathBuf::from("a.iso"));
        assert_eq!(full_path_for(Some(Path::new("")), "a.iso"), PathBuf::from("a.iso"));
    }

    #[test]
    fn scratch_dir_depends_on_worker_count() {
        assert_eq!(scratch_dir_for(None, "a.iso", 4), PathBuf::from("_a.iso.4"));
        assert_eq!(scratch_dir_for(None, "a.iso", 8), PathBuf::from("_a.iso.8"));
        assert_eq!(
            scratch_dir_for(Some(Path::new("/var/tmp")), "a.iso", 4),
            PathBuf::from("/var/tmp/_a.iso.4")
        );
    }

    #[test]
    fn new_derives_all_paths() {
        let t = DownloadTarget::new("f.bin", Some(Path::new("dl")), None, 1000, 4);
        assert_eq!(t.name(), "f.bin");
        assert_eq!(t.full_path(), Path::new("dl/f.bin"));
        assert_eq!(t.scratch_dir(), Path::new("_f.bin.4"));
        assert_eq!(t.total_size(), 1000);
        assert_eq!(t.worker_count(), 4);
        assert_eq!(t.scratch().chunk_path(2), PathBuf::from("_f.bin.4/f.bin.4.2"));
    }

    #[test]
    fn from_url_dedupes_against_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("report.csv"), b"old").unwrap();
        let t = DownloadTarget::from_url(
            "https://example.com/data/report.csv",
            Some(dir.path()),
            Some(dir.path()),
            10,
            2,
        );
        assert_eq!(t.name(), "report.csv-1");
        assert_eq!(t.full_path(), dir.path().join("report.csv-1"));
        assert_eq!(t.scratch_dir(), dir.path().join("_report.csv-1.2"));
    }

    #[test]
    fn from_url_without_segment_uses_default_name() {
        let t = DownloadTarget::from_url("https://example.com/", None, None, 1, 1);
        assert_eq!(t.name(), DEFAULT_NAME);
    }
}
