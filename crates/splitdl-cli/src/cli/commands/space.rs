//! `splitdl space <size>` – run the admission check on its own.

use anyhow::Result;
use splitdl_core::space::{self, SystemVolume};

pub fn run_space(size: u64, extra: u64) -> Result<()> {
    let volume = SystemVolume::new();
    space::ensure_free(&volume, size, extra)?;
    println!(
        "OK: {} has room for {} bytes",
        volume.root().display(),
        size.saturating_add(extra)
    );
    Ok(())
}
