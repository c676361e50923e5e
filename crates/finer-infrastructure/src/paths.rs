//! Path resolution for finer configuration and session data.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/finer/             # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/finer/        # Data directory (default storage dir)
//! ├── session-state            # Session blob (all sections except settings)
//! ├── session-api-key          # Settings, one file per key
//! ├── session-demo-mode
//! └── session-api-provider
//! ```
//!
//! `FINER_CONFIG` overrides the config file path and `FINER_STORAGE_DIR`
//! overrides the storage directory.

use finer_core::{FinerError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "finer";

/// Environment variable overriding the config file path.
pub const CONFIG_ENV: &str = "FINER_CONFIG";
/// Environment variable overriding the storage directory.
pub const STORAGE_DIR_ENV: &str = "FINER_STORAGE_DIR";

pub struct FinerPaths;

impl FinerPaths {
    /// Returns the finer configuration directory (e.g. `~/.config/finer/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR))
            .ok_or_else(|| FinerError::config("Cannot find config directory"))
    }

    /// Returns the finer data directory (e.g. `~/.local/share/finer/`).
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .ok_or_else(|| FinerError::config("Cannot find data directory"))
    }

    /// Returns the config file path, honouring `FINER_CONFIG`.
    pub fn config_file() -> Result<PathBuf> {
        match env_path(CONFIG_ENV) {
            Some(path) => Ok(path),
            None => Ok(Self::config_dir()?.join("config.toml")),
        }
    }

    /// Default storage directory when the config does not name one.
    pub fn default_storage_dir() -> Result<PathBuf> {
        Self::data_dir()
    }

    /// The storage directory override from `FINER_STORAGE_DIR`, if set.
    pub fn storage_dir_override() -> Option<PathBuf> {
        env_path(STORAGE_DIR_ENV)
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
