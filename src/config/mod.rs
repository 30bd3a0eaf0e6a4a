//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables (`DBUS_PROPS_*`)
//!
//! ```toml
//! [properties]
//! default_update = "emits_invalidation"
//! suppress_unchanged = true
//!
//! [logging]
//! filter = "dbus_props=debug"
//! json = false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BusError, Result};
use crate::property::NotificationStrategy;

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Property defaults
    #[serde(default)]
    pub properties: PropertyConfig,

    /// Logging setup
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| BusError::Config(format!("Failed to read config file {path:?}: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| BusError::Config(format!("Failed to parse config: {e}")))
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dbus-props").join("config.toml"))
    }

    /// Load the default file if it exists, then overlay the environment
    pub fn load() -> Result<Self> {
        let base = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };
        Ok(base.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values found through `lookup`; unparsable values are
    /// logged and skipped
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = lookup("DBUS_PROPS_DEFAULT_UPDATE") {
            match val.parse() {
                Ok(update) => self.properties.default_update = update,
                Err(e) => tracing::warn!("Ignoring DBUS_PROPS_DEFAULT_UPDATE: {e}"),
            }
        }
        if let Some(val) = lookup("DBUS_PROPS_SUPPRESS_UNCHANGED") {
            match val.parse() {
                Ok(flag) => self.properties.suppress_unchanged = flag,
                Err(e) => tracing::warn!("Ignoring DBUS_PROPS_SUPPRESS_UNCHANGED: {e}"),
            }
        }
        if let Some(filter) = lookup("DBUS_PROPS_LOG") {
            self.logging.filter = filter;
        }
        if let Some(val) = lookup("DBUS_PROPS_LOG_JSON") {
            match val.parse() {
                Ok(flag) => self.logging.json = flag,
                Err(e) => tracing::warn!("Ignoring DBUS_PROPS_LOG_JSON: {e}"),
            }
        }
        self
    }
}

/// Defaults applied by [`crate::property::PropertyCore::create_with`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyConfig {
    /// Strategy for properties created without an explicit one
    pub default_update: NotificationStrategy,

    /// Skip owner-side emission when the stored value is unchanged
    pub suppress_unchanged: bool,
}

impl Default for PropertyConfig {
    fn default() -> Self {
        Self {
            default_update: NotificationStrategy::EmitsValue,
            suppress_unchanged: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,

    /// Emit JSON lines instead of text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Install a global `tracing` subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| BusError::Config(format!("Failed to install subscriber: {e}")))
}
