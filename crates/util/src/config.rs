//! Console configuration.
//!
//! Settings come from an optional JSON file (`~/.config/rconsole/config.json`
//! on most platforms, or `RCONSOLE_CONFIG_PATH`) and are then overridden by
//! environment variables. A missing or unparsable file falls back to defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs_next::config_dir;
use rconsole_types::{Locale, ParamKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{APP_DIR_NAME, expand_tilde};

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "RCONSOLE_CONFIG_PATH";
pub const API_BASE_ENV: &str = "RCONSOLE_API_BASE";
pub const DEFAULT_LICENSE_ENV: &str = "RCONSOLE_DEFAULT_LICENSE";
pub const DEFAULT_TEST_VALUE_ENV: &str = "RCONSOLE_DEFAULT_TEST_VALUE";
pub const LOCALE_ENV: &str = "RCONSOLE_LOCALE";

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Base URL of the backend API
    pub api_base: String,
    pub locale: Locale,
    /// Value offered for license key parameters when none was entered
    pub default_license: Option<String>,
    /// Value offered for other text parameters when none was entered
    pub default_test_value: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            locale: Locale::default(),
            default_license: None,
            default_test_value: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ConsoleConfig {
    /// Load from the default location and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = read_config_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Configured fallback value for a parameter, if any.
    pub fn prefill_for(&self, param_id: &str, kind: &ParamKind) -> Option<&str> {
        if param_id.eq_ignore_ascii_case("licensekey") {
            return self.default_license.as_deref();
        }
        match kind {
            ParamKind::Text => self.default_test_value.as_deref(),
            _ => None,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Some(base) = non_empty_env(API_BASE_ENV) {
            self.api_base = base;
        }
        if let Some(license) = non_empty_env(DEFAULT_LICENSE_ENV) {
            self.default_license = Some(license);
        }
        if let Some(value) = non_empty_env(DEFAULT_TEST_VALUE_ENV) {
            self.default_test_value = Some(value);
        }
        if let Some(raw) = non_empty_env(LOCALE_ENV) {
            match raw.parse::<Locale>() {
                Ok(locale) => self.locale = locale,
                Err(error) => warn!(value = %raw, error = %error, "ignoring {LOCALE_ENV}"),
            }
        }
    }
}

/// `<config dir>/rconsole`, the root for every file the console writes.
pub fn config_root() -> PathBuf {
    config_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR_NAME)
}

pub fn default_config_path() -> PathBuf {
    if let Some(path) = non_empty_env(CONFIG_PATH_ENV) {
        return expand_tilde(&path);
    }
    config_root().join(CONFIG_FILE_NAME)
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn read_config_file(path: &Path) -> Result<ConsoleConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(config) => Ok(config),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse config file; using defaults"
                );
                Ok(ConsoleConfig::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(ConsoleConfig::default()),
        Err(error) => Err(ConfigError::Io(error)),
    }
}
