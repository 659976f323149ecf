//! Engine configuration
//!
//! Loaded from (in order of priority):
//! 1. JSON file (`~/.config/fakesync/engine.json`)
//! 2. Environment variables (`FAKESYNC_DB_PATH`, `FAKESYNC_DEFAULT_USER`)
//! 3. Built-in defaults

use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Config filename in the fakesync config directory
pub const CONFIG_FILE: &str = "engine.json";

const DB_PATH_ENV: &str = "FAKESYNC_DB_PATH";
const DEFAULT_USER_ENV: &str = "FAKESYNC_DEFAULT_USER";

/// Identity used when a request carries none
pub const FALLBACK_USER: &str = "default";

/// Default and maximum page size for one listing endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLimits {
    pub default: usize,
    pub max: usize,
}

impl PageLimits {
    pub const fn new(default: usize, max: usize) -> Self {
        Self { default, max }
    }

    /// Resolve a requested page size
    ///
    /// Missing or non-positive sizes take the default, oversize requests are
    /// clamped to the maximum.
    pub fn resolve(&self, requested: Option<i64>) -> usize {
        let max = self.max.max(1);
        match requested {
            Some(n) if n > 0 => usize::try_from(n).unwrap_or(max).min(max),
            _ => self.default.clamp(1, max),
        }
    }
}

/// Runtime settings for a [`crate::SyncEngine`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// SQLite database file; `None` means the platform data directory
    pub database_path: Option<PathBuf>,
    /// Identity substituted when a request names no owner
    pub default_user: String,
    pub messages: PageLimits,
    pub history: PageLimits,
    pub events: PageLimits,
    pub connections: PageLimits,
    pub contact_search: PageLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            default_user: FALLBACK_USER.to_string(),
            messages: PageLimits::new(100, 500),
            history: PageLimits::new(100, 500),
            events: PageLimits::new(250, 2500),
            connections: PageLimits::new(100, 1000),
            contact_search: PageLimits::new(10, 30),
        }
    }
}

impl EngineConfig {
    /// Load configuration using the following priority:
    /// 1. JSON file (~/.config/fakesync/engine.json)
    /// 2. Environment variables
    /// 3. Defaults
    pub fn load() -> Result<Self> {
        if config::config_exists(CONFIG_FILE) {
            debug!("[CONFIG] Loading {}", CONFIG_FILE);
            return config::load_json(CONFIG_FILE);
        }
        Ok(Self::from_env())
    }

    /// Defaults overridden by process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup(DB_PATH_ENV).filter(|v| !v.is_empty()) {
            config.database_path = Some(PathBuf::from(path));
        }
        if let Some(user) = lookup(DEFAULT_USER_ENV).filter(|v| !v.trim().is_empty()) {
            config.default_user = user.trim().to_string();
        }
        config
    }

    /// Parse configuration from a JSON string; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Database file to open: the configured path, else `fakesync.sqlite`
    /// under the platform data directory
    pub fn database_path(&self) -> Option<PathBuf> {
        self.database_path
            .clone()
            .or_else(|| config::data_dir().map(|d| d.join("fakesync.sqlite")))
    }

    /// Write this configuration to the config directory
    pub fn save(&self) -> Result<PathBuf> {
        config::save_json(CONFIG_FILE, self)
    }
}
