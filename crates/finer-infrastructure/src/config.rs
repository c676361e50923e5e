//! Application configuration loaded from `config.toml`.
//!
//! ```toml
//! [storage]
//! dir = "/home/me/.local/share/finer"
//!
//! [ai]
//! timeout_secs = 120
//! gemini_model = "gemini-2.5-flash"
//! openai_model = "gpt-4o"
//! demo_delay_min_ms = 1200
//! demo_delay_max_ms = 2000
//! temperature = 0.7
//! max_output_tokens = 4096
//!
//! [ai.task_models]
//! proposal-draft = "gemini-2.5-pro"
//! ```
//!
//! Every key is optional. A missing file yields the defaults.

use crate::paths::FinerPaths;
use finer_core::{FinerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct StorageConfig {
    /// Directory for the session blob and settings keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AiConfig {
    pub timeout_secs: u64,
    pub gemini_model: String,
    pub openai_model: String,
    pub demo_delay_min_ms: u64,
    pub demo_delay_max_ms: u64,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Model overrides keyed by task name (`seed-chat`, `proposal-draft`, ...).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub task_models: BTreeMap<String, String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            gemini_model: "gemini-2.5-flash".to_string(),
            openai_model: "gpt-4o".to_string(),
            demo_delay_min_ms: 1200,
            demo_delay_max_ms: 2000,
            temperature: 0.7,
            max_output_tokens: 4096,
            task_models: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Loads from the default location (see [`FinerPaths::config_file`]).
    pub fn load() -> Result<Self> {
        Self::load_from(&FinerPaths::config_file()?)
    }

    /// Loads from `path`. A missing or empty file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("[Config] {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: AppConfig = toml::from_str(&content).map_err(|e| {
            FinerError::config(format!("invalid config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        tracing::info!("[Config] Loaded {}", path.display());
        Ok(config)
    }

    /// Writes the config as pretty TOML, replacing the file atomically.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FinerError::config(format!("failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.ai.demo_delay_min_ms > self.ai.demo_delay_max_ms {
            return Err(FinerError::config(
                "ai.demo_delay_min_ms must not exceed ai.demo_delay_max_ms",
            ));
        }
        if self.ai.timeout_secs == 0 {
            return Err(FinerError::config("ai.timeout_secs must be positive"));
        }
        Ok(())
    }

    /// Storage directory: `FINER_STORAGE_DIR`, then `[storage] dir`, then
    /// the platform data directory.
    pub fn storage_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = FinerPaths::storage_dir_override() {
            return Ok(dir);
        }
        match &self.storage.dir {
            Some(dir) => Ok(dir.clone()),
            None => FinerPaths::default_storage_dir(),
        }
    }
}
