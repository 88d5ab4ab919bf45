//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the Airtable base id, cache freshness window, prefetch behavior, and
//! the flagship project name.
//!
//! Configuration is stored at `~/.config/empathy-ledger/config.json`. The
//! Airtable credentials are taken from the environment
//! (`AIRTABLE_API_KEY`, `AIRTABLE_BASE_ID`), never written to disk.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "empathy-ledger";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Consider cached collections stale after 1 hour.
/// Balances freshness with reducing unnecessary API calls for
/// slowly-changing archive data.
const DEFAULT_CACHE_TTL_MINUTES: i64 = 60;

/// Project whose stories are highlighted as flagship content.
const DEFAULT_FLAGSHIP_PROJECT: &str = "Orange Sky";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Airtable personal access token; environment-only, never persisted.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub base_id: Option<String>,
    pub cache_ttl_minutes: i64,
    /// Refresh cache-first hits in the background.
    pub prefetch: bool,
    pub flagship_project: String,
    /// Override for the cache directory; defaults to the platform cache dir.
    pub cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_id: None,
            cache_ttl_minutes: DEFAULT_CACHE_TTL_MINUTES,
            prefetch: true,
            flagship_project: DEFAULT_FLAGSHIP_PROJECT.to_string(),
            cache_dir: None,
        }
    }
}

impl Config {
    /// Load the config file, then apply environment overrides.
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        // Load .env file if present (silently ignore if not found)
        let _ = dotenvy::dotenv();

        let path = Self::config_path()?;
        let mut config: Config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };

        if let Ok(key) = std::env::var("AIRTABLE_API_KEY") {
            config.api_key = Some(key);
        }
        if let Ok(base) = std::env::var("AIRTABLE_BASE_ID") {
            config.base_id = Some(base);
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the file-backed cache, scoped per base so switching
    /// bases never mixes collections.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;

        let mut path = cache_dir.join(APP_NAME);
        if let Some(ref base) = self.base_id {
            path = path.join(base);
        }
        Ok(path)
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cache_ttl_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cache_ttl_minutes, 60);
        assert!(config.prefetch);
        assert_eq!(config.flagship_project, "Orange Sky");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"base_id": "appX"}"#).unwrap();
        assert_eq!(config.base_id.as_deref(), Some("appX"));
        assert_eq!(config.cache_ttl_minutes, 60);
    }

    #[test]
    fn test_api_key_never_serialized() {
        let config = Config {
            api_key: Some("secret".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
