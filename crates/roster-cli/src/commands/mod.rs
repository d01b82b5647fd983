//! CLI subcommands.

pub mod config;
pub mod scrape;

use std::path::{Path, PathBuf};

use tracing::debug;

use roster_core::RosterConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("roster")
        .join("config.json")
}

/// Load the configuration from `config_path`, or from the default location
/// if a file exists there, or fall back to defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<RosterConfig> {
    if let Some(path) = config_path {
        debug!("Loading config from {}", path);
        return Ok(RosterConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(RosterConfig::from_file(&default_path)?)
    } else {
        Ok(RosterConfig::default())
    }
}
