pub mod check;
pub mod config;
pub mod export;
pub mod output;
pub mod process;

use std::path::{Path, PathBuf};

use tracing::debug;

use gstscan_core::models::config::GstScanConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gstscan")
        .join("config.json")
}

/// Load the explicit config file, else the default one, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<GstScanConfig> {
    if let Some(path) = config_path {
        return Ok(GstScanConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        Ok(GstScanConfig::from_file(&default_path)?)
    } else {
        Ok(GstScanConfig::default())
    }
}
