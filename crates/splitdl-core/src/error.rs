//! Error kinds for the admission, monitoring and merge phases.
//!
//! Every variant names the file or directory involved so the caller can
//! report it without extra bookkeeping. Nothing here is retried internally.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Free space on the system volume is below what the download needs.
    #[error("there is not sufficient free space on the disk")]
    InsufficientSpace,

    /// The OS free-space query itself failed.
    #[error("failed to query free space on {}", .root.display())]
    FreeSpaceQuery {
        root: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Walking the scratch directory failed while measuring progress.
    #[error("failed to get directory size of {}", .dir.display())]
    ProgressRead {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create scratch directory {}", .dir.display())]
    ScratchDirCreate {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create {} in download location", .path.display())]
    FinalFileCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open chunk {index} ({}) in download location", .path.display())]
    ChunkOpen {
        index: usize,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy chunk {index} ({}) into the destination file", .path.display())]
    ChunkCopy {
        index: usize,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove chunk {index} ({}) in download location", .path.display())]
    ChunkDelete {
        index: usize,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove scratch directory {}", .dir.display())]
    ScratchDirRemove {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CoreError {
    /// Worker index of the chunk a merge-phase error refers to, if any.
    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            CoreError::ChunkOpen { index, .. }
            | CoreError::ChunkCopy { index, .. }
            | CoreError::ChunkDelete { index, .. } => Some(*index),
            _ => None,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
