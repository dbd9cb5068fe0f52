//! Configuration management for issue-status-metrics.
//!
//! Handles:
//! - The configured status set
//! - Accounting settings (closure grace period, lenient parsing)
//! - Display options
//!
//! A global file under the user config directory is merged with an optional
//! `.status-metrics.toml` in the working directory.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analytics::DEFAULT_CLOSE_GRACE_MINUTES;
use crate::error::{MetricsError, Result};
use crate::model::StatusSet;
use crate::util::{atomic_write, parse_grace_period};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Statuses to account for.
    #[serde(default)]
    pub statuses: StatusConfig,
    /// Accounting settings.
    #[serde(default)]
    pub accounting: AccountingConfig,
    /// Display options.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Project-specific configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = ".status-metrics.toml";

/// Keys accepted by [`Config::get_value`] and [`Config::set_value`].
pub const CONFIG_KEYS: &[&str] = &[
    "statuses.names",
    "accounting.grace_period",
    "accounting.lenient",
    "display.humanize",
    "display.show_titles",
];

impl Config {
    /// Load configuration from default locations.
    pub fn load() -> Result<Self> {
        let config_path = default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration with project-specific overrides.
    ///
    /// Searches for `.status-metrics.toml` in the given directory and merges
    /// it over the global configuration.
    pub fn load_for_project(project_dir: &Path) -> Result<Self> {
        let mut config = Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable global configuration");
            Self::default()
        });

        let project_config_path = project_dir.join(PROJECT_CONFIG_FILENAME);
        if project_config_path.exists() {
            let overlay = ConfigOverlay::load_from(&project_config_path)?;
            debug!(path = %project_config_path.display(), "Applying project configuration");
            config.merge_from(&overlay);
            config.validate()?;
        }

        Ok(config)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => MetricsError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => MetricsError::io(format!("Failed to read config file: {}", path.display()), e),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| MetricsError::InvalidConfig {
            message: format!("{}: {e}", path.display()),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Merge an overlay into this config. Only keys the overlay sets win.
    pub fn merge_from(&mut self, other: &ConfigOverlay) {
        if let Some(names) = &other.statuses.names {
            self.statuses.names = names.clone();
        }

        if let Some(grace_period) = &other.accounting.grace_period {
            self.accounting.grace_period = grace_period.clone();
        }
        if let Some(lenient) = other.accounting.lenient {
            self.accounting.lenient = lenient;
        }

        if let Some(humanize) = other.display.humanize {
            self.display.humanize = humanize;
        }
        if let Some(show_titles) = other.display.show_titles {
            self.display.show_titles = show_titles;
        }
    }

    /// Check values that serde alone cannot.
    pub fn validate(&self) -> Result<()> {
        self.grace_period().map(|_| ())
    }

    /// Configured statuses as an ordered set.
    #[must_use]
    pub fn status_set(&self) -> StatusSet {
        self.statuses.names.iter().map(String::as_str).collect()
    }

    /// Closure grace period.
    pub fn grace_period(&self) -> Result<Duration> {
        parse_grace_period(&self.accounting.grace_period).map_err(|e| MetricsError::InvalidConfig {
            message: format!("accounting.grace_period: {e}"),
        })
    }

    /// Read a value by dotted key.
    pub fn get_value(&self, key: &str) -> Result<String> {
        Ok(match key {
            "statuses.names" => self.statuses.names.join(","),
            "accounting.grace_period" => self.accounting.grace_period.clone(),
            "accounting.lenient" => self.accounting.lenient.to_string(),
            "display.humanize" => self.display.humanize.to_string(),
            "display.show_titles" => self.display.show_titles.to_string(),
            _ => return Err(unknown_key(key)),
        })
    }

    /// Set a value by dotted key.
    ///
    /// `statuses.names` takes a comma-separated list.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "statuses.names" => {
                self.statuses.names = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "accounting.grace_period" => {
                parse_grace_period(value).map_err(|e| MetricsError::ConfigError {
                    message: e.to_string(),
                })?;
                self.accounting.grace_period = value.trim().to_string();
            }
            "accounting.lenient" => self.accounting.lenient = parse_bool(value)?,
            "display.humanize" => self.display.humanize = parse_bool(value)?,
            "display.show_titles" => self.display.show_titles = parse_bool(value)?,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let config_path = default_config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to a specific path, atomically.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| MetricsError::InvalidConfig {
            message: format!("Failed to serialize config: {e}"),
        })?;

        atomic_write(path, content.as_bytes())
    }
}

/// Partial configuration read from a project file.
///
/// Every key is optional so that a project file overrides only what it names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigOverlay {
    /// Status overrides.
    #[serde(default)]
    pub statuses: StatusOverlay,
    /// Accounting overrides.
    #[serde(default)]
    pub accounting: AccountingOverlay,
    /// Display overrides.
    #[serde(default)]
    pub display: DisplayOverlay,
}

impl ConfigOverlay {
    /// Load an overlay from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MetricsError::io(format!("Failed to read config file: {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| MetricsError::InvalidConfig {
            message: format!("{}: {e}", path.display()),
        })
    }
}

/// `[statuses]` keys of a [`ConfigOverlay`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusOverlay {
    /// Replaces the status list when set.
    pub names: Option<Vec<String>>,
}

/// `[accounting]` keys of a [`ConfigOverlay`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountingOverlay {
    /// Closure grace period, e.g. `5m`.
    pub grace_period: Option<String>,
    /// Skip malformed item records.
    pub lenient: Option<bool>,
}

/// `[display]` keys of a [`ConfigOverlay`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayOverlay {
    /// Humanized durations in text output.
    pub humanize: Option<bool>,
    /// Item titles in per-item text output.
    pub show_titles: Option<bool>,
}

/// Status set configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Status names, in report order.
    #[serde(default)]
    pub names: Vec<String>,
}

/// Accounting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountingConfig {
    /// How long after closure events are still honoured, e.g. `5m`.
    #[serde(default = "default_grace_period")]
    pub grace_period: String,
    /// Skip malformed item records instead of failing.
    #[serde(default = "default_true")]
    pub lenient: bool,
}

impl Default for AccountingConfig {
    fn default() -> Self {
        Self {
            grace_period: default_grace_period(),
            lenient: true,
        }
    }
}

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Print durations as `1h 2m` in text output instead of seconds.
    #[serde(default = "default_true")]
    pub humanize: bool,
    /// Show item titles in per-item text output.
    #[serde(default = "default_true")]
    pub show_titles: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            humanize: true,
            show_titles: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_grace_period() -> String {
    format!("{DEFAULT_CLOSE_GRACE_MINUTES}m")
}

fn unknown_key(key: &str) -> MetricsError {
    MetricsError::ConfigError {
        message: format!("Unknown configuration key: {key} (known: {})", CONFIG_KEYS.join(", ")),
    }
}

/// Parse boolean value.
fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(MetricsError::ConfigError {
            message: format!("Invalid boolean value: {s}. Use true/false."),
        }),
    }
}

/// Get the default configuration path.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| MetricsError::Unsupported {
        feature: "config directory discovery".to_string(),
    })?;

    Ok(config_dir.join("issue-status-metrics").join("config.toml"))
}
