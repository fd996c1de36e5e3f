//! Configuration management for taxiledger.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::Duration;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "taxiledger";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "ledger.db";

/// Shared secret mixed into checksum activation codes.
///
/// Changing it invalidates every code already handed out.
pub const DEFAULT_LICENSE_SECRET: &str = "TUNISIE_TAXI_LOUAGE_SECRET_2025";

/// Longest trial that can be configured, in days.
pub const MAX_TRIAL_DAYS: u32 = 3650;

/// Largest expiry warning window that can be configured, in days.
pub const MAX_WARNING_DAYS: u32 = 365;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `TAXILEDGER_`, sections split on `__`)
/// 2. TOML config file at `~/.config/taxiledger/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// License and trial configuration.
    pub license: LicenseConfig,
    /// Maintenance tracking configuration.
    pub maintenance: MaintenanceConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/taxiledger/ledger.db`
    pub database_path: Option<PathBuf>,
}

/// Which activation code scheme is accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeKind {
    /// The 32-bit rolling checksum already used by distributed codes.
    #[default]
    Checksum,
    /// BLAKE3 keyed hash over the identifier and duration.
    Keyed,
}

/// License-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    /// Length of the trial granted at onboarding, in days.
    pub trial_days: u32,
    /// Remaining days at or below which the expiry warning is shown.
    pub warning_days: u32,
    /// Shared secret for the checksum scheme.
    pub secret: String,
    /// Activation code scheme.
    pub scheme: SchemeKind,
    /// 32-byte hex key for the keyed scheme.
    pub keyed_secret: Option<String>,
    /// Enables the `admin` onboarding shortcut and the `0000` master pin.
    /// Never turn this on for a real installation.
    pub developer_bypass: bool,
}

/// Maintenance-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Remaining distance (km) below which a task is flagged as due soon.
    pub warning_km: u32,
    /// Number of most recent revenue days the dashboard aggregates.
    pub recent_revenue_window: usize,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            trial_days: 30,
            warning_days: 5,
            secret: DEFAULT_LICENSE_SECRET.to_string(),
            scheme: SchemeKind::Checksum,
            keyed_secret: None,
            developer_bypass: false,
        }
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            warning_km: 500,
            recent_revenue_window: 30,
        }
    }
}

fn hex_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9a-fA-F]{64}$").expect("static regex is valid"))
}

impl Config {
    /// Load configuration from all sources, with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("TAXILEDGER_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.license.trial_days == 0 {
            return Err(Error::ConfigValidation {
                message: "trial_days must be greater than 0".to_string(),
            });
        }

        if self.license.trial_days > MAX_TRIAL_DAYS {
            return Err(Error::ConfigValidation {
                message: format!("trial_days cannot exceed {MAX_TRIAL_DAYS}"),
            });
        }

        if self.license.warning_days > MAX_WARNING_DAYS {
            return Err(Error::ConfigValidation {
                message: format!("warning_days cannot exceed {MAX_WARNING_DAYS}"),
            });
        }

        if self.license.secret.is_empty() {
            return Err(Error::ConfigValidation {
                message: "license secret cannot be empty".to_string(),
            });
        }

        if self.license.scheme == SchemeKind::Keyed {
            match &self.license.keyed_secret {
                Some(key) if hex_key_pattern().is_match(key) => {}
                Some(_) => {
                    return Err(Error::ConfigValidation {
                        message: "keyed_secret must be 64 hex characters".to_string(),
                    });
                }
                None => {
                    return Err(Error::ConfigValidation {
                        message: "keyed scheme requires keyed_secret".to_string(),
                    });
                }
            }
        }

        if self.maintenance.warning_km == 0 {
            return Err(Error::ConfigValidation {
                message: "warning_km must be greater than 0".to_string(),
            });
        }

        if self.maintenance.recent_revenue_window == 0 {
            return Err(Error::ConfigValidation {
                message: "recent_revenue_window must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

impl LicenseConfig {
    /// Get the trial length as a Duration.
    #[must_use]
    pub fn trial_length(&self) -> Duration {
        Duration::days(i64::from(self.trial_days))
    }
}
