//! Application configuration management.
//!
//! Settings come from three layers, later ones winning:
//! built-in defaults, `~/.config/hnyfind/config.json`, and environment
//! variables (`HONEYCOMB_API_HOST`, `HONEYCOMB_UI_HOST`, `HNYFIND_CACHE_DIR`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "hnyfind";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_API_HOST: &str = "https://api.honeycomb.io";
const DEFAULT_UI_HOST: &str = "https://ui.honeycomb.io";

const API_HOST_VAR: &str = "HONEYCOMB_API_HOST";
const UI_HOST_VAR: &str = "HONEYCOMB_UI_HOST";
const CACHE_DIR_VAR: &str = "HNYFIND_CACHE_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub api_host: String,
    pub ui_host: String,
    pub cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            ui_host: DEFAULT_UI_HOST.to_string(),
            cache_dir: None,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Ok(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            Ok(_) => Self::default(),
            Err(e) => {
                debug!(error = %e, "No config directory, using defaults");
                Self::default()
            }
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(host) = lookup(API_HOST_VAR) {
            self.api_host = host;
        }
        if let Some(host) = lookup(UI_HOST_VAR) {
            self.ui_host = host;
        }
        if let Some(dir) = lookup(CACHE_DIR_VAR) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
