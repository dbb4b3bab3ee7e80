//! Configuration management for the address forecast service
//!
//! Handles loading configuration from a TOML file and `FORECAST__*`
//! environment variables, and validates the result.

use crate::ServiceError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Geocoding provider settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Forecast provider settings
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Geocoding provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of the Nominatim instance
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Client identifier sent as `User-Agent`
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Timeout for address lookups in milliseconds
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_ms: u64,
    /// Timeout for autocomplete lookups in milliseconds
    #[serde(default = "default_suggestion_timeout")]
    pub suggestion_timeout_ms: u64,
}

/// Forecast provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Base URL of the `OpenMeteo` API
    #[serde(default = "default_forecast_base_url")]
    pub base_url: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_forecast_timeout")]
    pub timeout_ms: u64,
    /// Days requested from the provider
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds between expired-entry sweeps, 0 disables the sweep
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    "WeatherApp/1.0".to_string()
}

fn default_geocoding_timeout() -> u64 {
    3000
}

fn default_suggestion_timeout() -> u64 {
    1000
}

fn default_forecast_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_forecast_timeout() -> u64 {
    3000
}

fn default_forecast_days() -> u8 {
    7
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_geocoding_timeout(),
            suggestion_timeout_ms: default_suggestion_timeout(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: default_forecast_base_url(),
            timeout_ms: default_forecast_timeout(),
            forecast_days: default_forecast_days(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `config.toml` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));
        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. FORECAST__SERVER__PORT=8080
        builder = builder.add_source(
            Environment::with_prefix("FORECAST")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        let timeouts = [
            ("geocoding.timeout_ms", self.geocoding.timeout_ms),
            (
                "geocoding.suggestion_timeout_ms",
                self.geocoding.suggestion_timeout_ms,
            ),
            ("forecast.timeout_ms", self.forecast.timeout_ms),
        ];
        for (name, value) in timeouts {
            if !(1..=10_000).contains(&value) {
                return Err(ServiceError::config(format!(
                    "{name} must be between 1 and 10000 ms, got: {value}"
                ))
                .into());
            }
        }

        if !(1..=16).contains(&self.forecast.forecast_days) {
            return Err(ServiceError::config(format!(
                "forecast.forecast_days must be between 1 and 16, got: {}",
                self.forecast.forecast_days
            ))
            .into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ServiceError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ServiceError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("geocoding.base_url", &self.geocoding.base_url),
            ("forecast.base_url", &self.forecast.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ServiceError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.geocoding.user_agent.trim().is_empty() {
            return Err(ServiceError::config("geocoding.user_agent cannot be empty").into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.geocoding.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.geocoding.user_agent, "WeatherApp/1.0");
        assert_eq!(config.geocoding.timeout_ms, 3000);
        assert_eq!(config.geocoding.suggestion_timeout_ms, 1000);
        assert_eq!(config.forecast.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.forecast.forecast_days, 7);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = AppConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_timeout_range() {
        let mut config = AppConfig::default();
        config.forecast.timeout_ms = 60_000;
        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("forecast.timeout_ms must be between")
        );
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = AppConfig::default();
        config.geocoding.base_url = "nominatim.openstreetmap.org".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("address-forecast-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 8088\n\n[forecast]\nforecast_days = 10\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let config = AppConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.forecast.forecast_days, 10);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.geocoding.timeout_ms, 3000);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config =
            AppConfig::load_from_path(Some(PathBuf::from("/nonexistent/forecast.toml"))).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
    }
}
