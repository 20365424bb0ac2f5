use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Global configuration loaded from `~/.config/demofetch/config.toml`.
/// Every key is optional; missing keys take the built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemofetchConfig {
    /// Directory holding the per-group MIX directories (`td`, `ra`).
    pub data_root: PathBuf,
    /// File name of the rejected-download copy, placed one level above the group directory.
    pub fallback_file_name: String,
    /// Archive members whose names end with this (case-sensitive) are extracted.
    pub member_suffix: String,
    /// Receive chunk size in bytes.
    pub chunk_size: usize,
    pub connect_timeout_secs: u64,
    /// Abort a transfer slower than this many bytes/sec for `low_speed_time_secs`.
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
}

impl Default for DemofetchConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("../data/mix"),
            fallback_file_name: "failed_download.zip".to_string(),
            member_suffix: ".MIX".to_string(),
            chunk_size: 10 * 1024,
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("demofetch")?;
    Ok(xdg_dirs.get_config_file("config.toml"))
}

/// Load configuration from disk, writing a default file if none exists.
/// Failing to write the default file is logged, not fatal.
pub fn load_or_init() -> Result<DemofetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DemofetchConfig::default();
        if let Err(e) = write_default(&path, &default_cfg) {
            tracing::warn!("could not write default config to {}: {:#}", path.display(), e);
        } else {
            tracing::info!("created default config at {}", path.display());
        }
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg: DemofetchConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

fn write_default(path: &std::path::Path, cfg: &DemofetchConfig) -> Result<()> {
    let toml = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml)?;
    Ok(())
}
