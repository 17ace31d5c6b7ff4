//! Scratch directory layout: one chunk file per `(worker_count, worker_index)`.
//!
//! Workers write into [`ScratchArena::chunk_path`], the merger reads the same
//! paths back in index order. Both sides go through this type so the naming
//! `<dir>/<name>.<worker_count>.<worker_index>` lives in one place.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone)]
pub struct ScratchArena {
    dir: PathBuf,
    name: String,
    worker_count: usize,
}

impl ScratchArena {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>, worker_count: usize) -> Self {
        ScratchArena {
            dir: dir.into(),
            name: name.into(),
            worker_count,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Path of the chunk written by `worker_index`.
    pub fn chunk_path(&self, worker_index: usize) -> PathBuf {
        self.dir
            .join(format!("{}.{}.{}", self.name, self.worker_count, worker_index))
    }

    /// All chunk paths in ascending worker index order.
    pub fn chunk_paths(&self) -> impl Iterator<Item = (usize, PathBuf)> + '_ {
        (0..self.worker_count).map(move |i| (i, self.chunk_path(i)))
    }

    /// Creates the scratch directory (and parents). Existing directories are kept.
    pub fn create(&self) -> CoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|source| CoreError::ScratchDirCreate {
            dir: self.dir.clone(),
            source,
        })
    }

    /// Removes the scratch directory with everything left in it, including
    /// files the OS drops there on its own (e.g. `.DS_Store`).
    pub fn remove(&self) -> CoreResult<()> {
        fs::remove_dir_all(&self.dir).map_err(|source| CoreError::ScratchDirRemove {
            dir: self.dir.clone(),
            source,
        })
    }
}
