//! Configuration loading and persistence.
//!
//! Handles the TOML config file (~/.config/antipong/config.toml) with
//! `[game]`, `[display]` and `[score]` sections.

use std::path::{Path, PathBuf};

use antipong::AntipongConfig;

/// Returns `~/.config/antipong/config.toml`.
pub fn default_config_path() -> PathBuf {
    let dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("antipong");
    dir.join("config.toml")
}

/// Load persisted config from disk. If the file does not exist, creates it
/// with all-defaults and returns that.
pub fn load(path: &Path) -> AntipongConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<AntipongConfig>(&contents) {
            Ok(config) => {
                tracing::info!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("failed to parse {}: {e}", path.display());
                AntipongConfig::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let defaults = AntipongConfig::default();
            tracing::info!("no config file found, creating {}", path.display());
            save_to(path, &defaults);
            defaults
        }
        Err(e) => {
            tracing::warn!("failed to read {}: {e}", path.display());
            AntipongConfig::default()
        }
    }
}

/// Write config to a specific path. Creates parent dirs if needed. Never panics.
pub fn save_to(path: &Path, config: &AntipongConfig) {
    if let Some(dir) = path.parent()
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        tracing::warn!("failed to create config dir {}: {e}", dir.display());
        return;
    }
    match toml::to_string_pretty(config) {
        Ok(contents) => {
            if let Err(e) = std::fs::write(path, contents) {
                tracing::warn!("failed to write {}: {e}", path.display());
            }
        }
        Err(e) => {
            tracing::warn!("failed to serialize config: {e}");
        }
    }
}
