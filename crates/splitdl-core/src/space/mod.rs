//! Disk space admission check.
//!
//! Runs before any chunk file exists, so a rejection leaves nothing behind.

use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};

/// Source of free-byte counts for the volume downloads land on.
pub trait FreeSpaceProvider {
    /// Bytes currently available to this process.
    fn free_bytes(&self) -> CoreResult<u64>;
}

/// The OS system volume: `C:\` on Windows, `/` everywhere else.
pub fn system_volume_root() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("C:\\")
    } else {
        PathBuf::from("/")
    }
}

/// Free space of the volume holding `root` (defaults to the system volume).
#[derive(Debug, Clone)]
pub struct SystemVolume {
    root: PathBuf,
}

impl SystemVolume {
    pub fn new() -> Self {
        SystemVolume {
            root: system_volume_root(),
        }
    }

    pub fn at(root: impl AsRef<Path>) -> Self {
        SystemVolume {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for SystemVolume {
    fn default() -> Self {
        Self::new()
    }
}

impl FreeSpaceProvider for SystemVolume {
    fn free_bytes(&self) -> CoreResult<u64> {
        fs2::available_space(&self.root).map_err(|source| CoreError::FreeSpaceQuery {
            root: self.root.clone(),
            source,
        })
    }
}

/// Admits the download iff free space covers `total_size + required_extra`.
///
/// `required_extra` accounts for data held twice while in flight (callers
/// pass the largest chunk size, or zero).
pub fn ensure_free<P: FreeSpaceProvider + ?Sized>(
    provider: &P,
    total_size: u64,
    required_extra: u64,
) -> CoreResult<()> {
    let required = total_size.saturating_add(required_extra);
    let free = provider.free_bytes()?;
    if free < required {
        tracing::warn!(free, required, "not enough free space");
        return Err(CoreError::InsufficientSpace);
    }
    tracing::debug!(free, required, "free space check passed");
    Ok(())
}
