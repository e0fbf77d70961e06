use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use domain::models::PermissionState;
use domain::services::{DebounceSettings, SessionSettings, MAX_HORIZON_DAYS};

/// Built-in defaults, also used as the base layer when no config file exists.
const DEFAULTS: &str = include_str!("../../../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub location: LocationConfig,
    pub crops: CropsConfig,
    pub places: PlacesConfig,
    pub connectivity: ConnectivityConfig,
    /// Fixed device position used in place of a GPS receiver.
    #[serde(default)]
    pub device: DeviceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_staleness_secs")]
    pub staleness_secs: u64,

    #[serde(default = "default_fix_timeout_ms")]
    pub fix_timeout_ms: u64,

    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CropsConfig {
    #[serde(default = "default_horizon_days")]
    pub horizon_days: i64,

    /// JSON file with a crop list; the bundled dataset is used when unset.
    #[serde(default)]
    pub dataset: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacesConfig {
    /// Google Maps Platform key. Empty disables place search and geocoding.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_places_base_url")]
    pub base_url: String,

    #[serde(default = "default_places_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectivityConfig {
    #[serde(default = "default_probe_url")]
    pub probe_url: String,

    #[serde(default = "default_probe_interval_secs")]
    pub interval_secs: u64,

    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,

    /// Answer given to permission prompts: granted, denied or undetermined.
    #[serde(default = "default_device_permission")]
    pub permission: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            permission: default_device_permission(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    PathBuf::from(".hive-logger")
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_log_format() -> String {
    "compact".to_string()
}
fn default_staleness_secs() -> u64 {
    3600
}
fn default_fix_timeout_ms() -> u64 {
    15000
}
fn default_search_debounce_ms() -> u64 {
    500
}
fn default_min_query_len() -> usize {
    3
}
fn default_horizon_days() -> i64 {
    domain::services::DEFAULT_HORIZON_DAYS
}
fn default_places_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}
fn default_places_timeout_ms() -> u64 {
    10000
}
fn default_probe_url() -> String {
    "https://clients3.google.com/generate_204".to_string()
}
fn default_probe_interval_secs() -> u64 {
    30
}
fn default_probe_timeout_ms() -> u64 {
    5000
}
fn default_device_permission() -> String {
    "granted".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. config/default.toml
    /// 3. config/local.toml (optional, for local development)
    /// 4. Environment variables with HIVE__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(DEFAULTS, config::FileFormat::Toml))
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("HIVE").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Builds from the built-in defaults plus `overrides`, without touching
    /// the filesystem or environment.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULTS, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "HIVE__STORAGE__DATA_DIR must not be empty".to_string(),
            ));
        }

        if !matches!(self.logging.format.as_str(), "json" | "pretty" | "compact") {
            return Err(ConfigValidationError::InvalidValue(format!(
                "logging.format must be 'json', 'pretty' or 'compact', got '{}'",
                self.logging.format
            )));
        }

        if self.location.staleness_secs == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "location.staleness_secs must be positive".to_string(),
            ));
        }

        if self.location.fix_timeout_ms == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "location.fix_timeout_ms must be positive".to_string(),
            ));
        }

        if self.location.min_query_len == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "location.min_query_len must be at least 1".to_string(),
            ));
        }

        if self.crops.horizon_days <= 0 || self.crops.horizon_days > MAX_HORIZON_DAYS {
            return Err(ConfigValidationError::InvalidValue(format!(
                "crops.horizon_days must be between 1 and {MAX_HORIZON_DAYS}, got {}",
                self.crops.horizon_days
            )));
        }

        if self.places.timeout_ms == 0 || self.connectivity.timeout_ms == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "HTTP timeouts must be positive".to_string(),
            ));
        }

        if self.connectivity.interval_secs == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "connectivity.interval_secs must be positive".to_string(),
            ));
        }

        self.device_permission()?;

        match (self.device.latitude, self.device.longitude) {
            (Some(lat), Some(lon)) => {
                if shared::validation::validate_latitude(lat).is_err() {
                    return Err(ConfigValidationError::InvalidValue(format!(
                        "device.latitude {lat} is out of range"
                    )));
                }
                if shared::validation::validate_longitude(lon).is_err() {
                    return Err(ConfigValidationError::InvalidValue(format!(
                        "device.longitude {lon} is out of range"
                    )));
                }
            }
            (None, None) => {}
            _ => {
                return Err(ConfigValidationError::InvalidValue(
                    "device.latitude and device.longitude must be set together".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn device_permission(&self) -> Result<PermissionState, ConfigValidationError> {
        self.device
            .permission
            .parse()
            .map_err(ConfigValidationError::InvalidValue)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            staleness_threshold: Duration::from_secs(self.location.staleness_secs),
            fix_timeout: Duration::from_millis(self.location.fix_timeout_ms),
        }
    }

    pub fn debounce_settings(&self) -> DebounceSettings {
        DebounceSettings {
            delay: Duration::from_millis(self.location.search_debounce_ms),
            min_query_len: self.location.min_query_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load_with_defaults() {
        let config = Config::load_for_test(&[]).expect("Failed to load config");

        assert_eq!(config.storage.data_dir, PathBuf::from(".hive-logger"));
        assert_eq!(config.location.staleness_secs, 3600);
        assert_eq!(config.location.search_debounce_ms, 500);
        assert_eq!(config.location.min_query_len, 3);
        assert_eq!(config.crops.horizon_days, 30);
        assert!(config.places.api_key.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_override() {
        let config = Config::load_for_test(&[
            ("storage.data_dir", "/var/lib/hive"),
            ("logging.level", "debug"),
            ("device.latitude", "28.7041"),
            ("device.longitude", "77.1025"),
        ])
        .expect("Failed to load config");

        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/hive"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.device.latitude, Some(28.7041));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_horizon() {
        let config = Config::load_for_test(&[("crops.horizon_days", "0")]).unwrap();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("horizon_days"));
    }

    #[test]
    fn test_config_validation_huge_horizon() {
        let config = Config::load_for_test(&[("crops.horizon_days", "100000000")]).unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("between 1 and 366"));

        let config = Config::load_for_test(&[("crops.horizon_days", "366")]).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_device_out_of_range() {
        let config = Config::load_for_test(&[
            ("device.latitude", "95.0"),
            ("device.longitude", "10.0"),
        ])
        .unwrap();
        assert!(config.validate().unwrap_err().to_string().contains("latitude"));
    }

    #[test]
    fn test_config_validation_half_device_position() {
        let config = Config::load_for_test(&[("device.latitude", "10.0")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_permission() {
        let config = Config::load_for_test(&[("device.permission", "sometimes")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_session_settings() {
        let config = Config::load_for_test(&[("location.fix_timeout_ms", "2500")]).unwrap();
        let settings = config.session_settings();
        assert_eq!(settings.staleness_threshold, Duration::from_secs(3600));
        assert_eq!(settings.fix_timeout, Duration::from_millis(2500));
        assert_eq!(config.debounce_settings().delay, Duration::from_millis(500));
    }
}
