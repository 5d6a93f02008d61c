// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! User-level configuration.
//!
//! Stored as `config.json` under `~/.slidegen` next to the global style
//! registry. A missing file reads as defaults so the tool works before
//! `setup` has ever run.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Config file name inside the user config directory.
pub const CONFIG_FILE: &str = "config.json";

/// Directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".slidegen";

/// User configuration shared across projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Engine name to API key.
    #[serde(default)]
    pub api_keys: BTreeMap<String, String>,
    #[serde(default = "default_engine")]
    pub default_engine: String,
    #[serde(default = "default_output_dir")]
    pub default_output_dir: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            api_keys: BTreeMap::new(),
            default_engine: default_engine(),
            default_output_dir: default_output_dir(),
        }
    }
}

fn default_engine() -> String {
    "gemini".to_string()
}

fn default_output_dir() -> String {
    "./slides".to_string()
}

/// User config directory (`~/.slidegen`), overridable through the
/// `SLIDEGEN_CONFIG_DIR` environment variable.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("SLIDEGEN_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(CONFIG_DIR_NAME))
}

/// Load the global config, returning defaults when the file is missing.
pub fn load_config() -> Result<GlobalConfig> {
    let Some(path) = config_dir().map(|dir| dir.join(CONFIG_FILE)) else {
        return Ok(GlobalConfig::default());
    };
    if !path.exists() {
        return Ok(GlobalConfig::default());
    }
    let contents = fs::read_to_string(&path)?;
    serde_json::from_str(&contents).map_err(|source| Error::Json { path, source })
}

/// Persist the global config, creating the config directory as needed.
pub fn save_config(config: &GlobalConfig) -> Result<()> {
    let dir = config_dir().ok_or_else(|| {
        Error::Validation("cannot locate a home directory for the config file".to_string())
    })?;
    fs::create_dir_all(&dir)?;
    let path = dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config).map_err(|source| Error::Json {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, json + "\n")?;
    log::info!("Saved config to {}", path.display());
    Ok(())
}

/// API key for an engine: config first, then the conventional
/// environment variables.
pub fn api_key_for(config: &GlobalConfig, engine: &str) -> Option<String> {
    if let Some(key) = config.api_keys.get(engine) {
        if !key.trim().is_empty() {
            return Some(key.clone());
        }
    }
    match engine {
        "gemini" => std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_fields_missing() {
        let config: GlobalConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.default_engine, "gemini");
        assert_eq!(config.default_output_dir, "./slides");
        assert!(config.api_keys.is_empty());
    }

    #[test]
    fn test_api_key_prefers_config_over_env() {
        let mut config = GlobalConfig::default();
        config
            .api_keys
            .insert("gemini".to_string(), "from-config".to_string());

        assert_eq!(api_key_for(&config, "gemini").as_deref(), Some("from-config"));
        assert_eq!(api_key_for(&config, "unknown"), None);
    }
}
