use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Global configuration loaded from `~/.config/splitdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitdlConfig {
    /// Number of range workers per download.
    pub workers: usize,
    /// Milliseconds between two progress measurements of the scratch directory.
    pub poll_interval_ms: u64,
    /// Destination directory (None = current directory).
    pub download_dir: Option<PathBuf>,
    /// Directory under which `_<name>.<workers>` scratch dirs are created (None = current directory).
    pub scratch_base: Option<PathBuf>,
    /// Require one extra chunk of free space on top of the file size.
    pub reserve_chunk_space: bool,
    /// Connect timeout for range requests, in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for SplitdlConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            poll_interval_ms: 100,
            download_dir: None,
            scratch_base: None,
            reserve_chunk_space: true,
            connect_timeout_secs: 30,
        }
    }
}

impl SplitdlConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("splitdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SplitdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SplitdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SplitdlConfig = toml::from_str(&data)?;
    Ok(cfg)
}
