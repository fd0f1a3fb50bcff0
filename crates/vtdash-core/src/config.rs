//! Configuration types for vtdash.
//!
//! Root configuration struct and nested section types with full defaults,
//! validation, YAML file loading, and environment variable overrides.
//! Command-line flags are applied by the binary on top of the result.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::tab::TabId;

/// Base URL of a VTAdmin API running with its default flags.
pub const DEFAULT_API_BASE: &str = "http://localhost:14200/api";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("environment variable {name}: {message}")]
    Env { name: String, message: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Root config
// ---------------------------------------------------------------------------

/// Root configuration for vtdash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub refresh: RefreshConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

/// VTAdmin API section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Auto-refresh section. Disabled unless asked for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_seconds: 30,
        }
    }
}

/// Terminal UI section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub default_tab: String,
    pub base_path: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_tab: TabId::DEFAULT.as_str().to_string(),
            base_path: "/".to_string(),
        }
    }
}

/// Logging section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "console".into(),
            file: String::new(),
        }
    }
}

impl Config {
    /// Load configuration: explicit file or the first file found in the
    /// standard locations, then environment overrides, then validation.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => find_config_file(),
        };
        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML configuration file. Missing sections keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, String> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|err| err.to_string())
    }

    /// Apply `VTDASH_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup("VTDASH_API_BASE").filter(|v| !v.trim().is_empty()) {
            self.api.base_url = base.trim().to_string();
        }
        if let Some(raw) = lookup("VTDASH_REFRESH_SECONDS").filter(|v| !v.trim().is_empty()) {
            let seconds = raw.trim().parse::<u64>().map_err(|err| ConfigError::Env {
                name: "VTDASH_REFRESH_SECONDS".into(),
                message: format!("{raw:?}: {err}"),
            })?;
            // Zero turns auto-refresh off without touching the interval.
            if seconds == 0 {
                self.refresh.enabled = false;
            } else {
                self.refresh.enabled = true;
                self.refresh.interval_seconds = seconds;
            }
        }
        if let Some(tab) = lookup("VTDASH_DEFAULT_TAB").filter(|v| !v.trim().is_empty()) {
            self.ui.default_tab = tab.trim().to_string();
        }
        if let Some(level) = lookup("VTDASH_LOG_LEVEL").filter(|v| !v.trim().is_empty()) {
            self.logging.level = level.trim().to_string();
        }
        Ok(())
    }

    /// Validates the entire configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api.base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::Invalid("api.base_url is required".into()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Invalid(
                "api.base_url must start with http:// or https://".into(),
            ));
        }
        if self.api.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "api.request_timeout_ms must be greater than 0".into(),
            ));
        }

        if self.refresh.interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "refresh.interval_seconds must be greater than 0".into(),
            ));
        }

        if TabId::parse(&self.ui.default_tab).is_none() {
            return Err(ConfigError::Invalid(format!(
                "ui.default_tab must be one of {}",
                TabId::ORDER
                    .iter()
                    .map(|tab| tab.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        if !self.ui.base_path.starts_with('/') {
            return Err(ConfigError::Invalid("ui.base_path must start with /".into()));
        }

        match self.logging.level.to_lowercase().trim() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Invalid(
                    "logging.level must be one of trace, debug, info, warn, error".into(),
                ))
            }
        }
        match self.logging.format.to_lowercase().trim() {
            "console" | "json" => {}
            _ => {
                return Err(ConfigError::Invalid(
                    "logging.format must be one of console, json".into(),
                ))
            }
        }

        Ok(())
    }

    /// Default tab, falling back to the built-in default when unparsable.
    #[must_use]
    pub fn default_tab(&self) -> TabId {
        TabId::parse(&self.ui.default_tab).unwrap_or(TabId::DEFAULT)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.api.request_timeout_ms)
    }

    /// Auto-refresh interval when enabled.
    #[must_use]
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh
            .enabled
            .then(|| Duration::from_secs(self.refresh.interval_seconds))
    }
}

/// Search for a configuration file in the standard locations.
/// Returns `None` if no config file is found.
pub fn find_config_file() -> Option<PathBuf> {
    config_search_paths()
        .into_iter()
        .map(|dir| dir.join("config.yaml"))
        .find(|candidate| candidate.is_file())
}

fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        paths.push(Path::new(&xdg).join("vtdash"));
    }
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(PathBuf::from(home).join(".config/vtdash"));
    }
    paths.push(PathBuf::from("."));

    paths
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
