//! Settings file loading
//!
//! The CLI reads pipeline settings from an optional TOML file under a
//! `[stats]` table; anything missing falls back to the defaults. The loaded
//! settings are immutable for the run.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use hostscope_core::StatsSettings;

use crate::error::CliError;

/// Top-level shape of the settings file
#[derive(Debug, Default, Deserialize)]
struct CliConfig {
    /// Pipeline settings under `[stats]`
    #[serde(default)]
    stats: StatsSettings,
}

/// Loads settings from `path`, or the defaults when no path is given
pub fn load_settings(path: Option<&Path>) -> Result<StatsSettings, CliError> {
    let Some(path) = path else {
        return Ok(StatsSettings::default());
    };
    let content = fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config: CliConfig = toml::from_str(&content).map_err(|source| CliError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded settings file");
    Ok(config.stats)
}
