//! Configuration management for the weather explorer
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::ExplorerError;
use crate::map::OverlayCategory;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the weather explorer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Open-Meteo endpoint configuration
    pub api: ApiConfig,
    /// Location search settings
    pub search: SearchConfig,
    /// Forecast request settings
    pub forecast: ForecastConfig,
    /// Map overlay settings
    pub overlay: OverlayConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Open-Meteo endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the forecast API
    #[serde(default = "default_forecast_base_url")]
    pub forecast_base_url: String,
    /// Base URL of the geocoding API
    #[serde(default = "default_geocoding_base_url")]
    pub geocoding_base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Location search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Location searched when the service starts (empty disables it)
    #[serde(default = "default_initial_location")]
    pub initial_location: String,
    /// Maximum number of geocoding candidates
    #[serde(default = "default_result_count")]
    pub result_count: u32,
    /// Optional language for geocoding results
    #[serde(default)]
    pub language: Option<String>,
}

/// Forecast request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Days requested for the hourly forecast
    #[serde(default = "default_hourly_days")]
    pub hourly_days: u32,
    /// Days requested for the daily forecast
    #[serde(default = "default_daily_days")]
    pub daily_days: u32,
    /// Optional timezone passed to the forecast API (e.g. "auto", "Europe/London")
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Map overlay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Category selected when the map is mounted
    #[serde(default = "default_overlay_category")]
    pub default_category: String,
    /// Seed for reproducible overlays; unseeded when absent
    #[serde(default)]
    pub seed: Option<u64>,
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
fn default_forecast_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_user_agent() -> String {
    format!("weather-explorer/{}", env!("CARGO_PKG_VERSION"))
}

fn default_initial_location() -> String {
    "London".to_string()
}

fn default_result_count() -> u32 {
    5
}

fn default_hourly_days() -> u32 {
    3
}

fn default_daily_days() -> u32 {
    7
}

fn default_overlay_category() -> String {
    "temperature".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            forecast_base_url: default_forecast_base_url(),
            geocoding_base_url: default_geocoding_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            initial_location: default_initial_location(),
            result_count: default_result_count(),
            language: None,
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            hourly_days: default_hourly_days(),
            daily_days: default_daily_days(),
            timezone: None,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            default_category: default_overlay_category(),
            seed: None,
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

impl ExplorerConfig {
    /// Load configuration from the default file location and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // WEATHER_EXPLORER__API__TIMEOUT_SECONDS=10 etc.
        builder = builder.add_source(
            Environment::with_prefix("WEATHER_EXPLORER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ExplorerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weather-explorer").join("config.toml"))
    }

    /// Apply default values to empty or zeroed configuration fields
    pub fn apply_defaults(&mut self) {
        if self.api.forecast_base_url.is_empty() {
            self.api.forecast_base_url = default_forecast_base_url();
        }
        if self.api.geocoding_base_url.is_empty() {
            self.api.geocoding_base_url = default_geocoding_base_url();
        }
        if self.api.timeout_seconds == 0 {
            self.api.timeout_seconds = default_timeout();
        }
        if self.api.user_agent.is_empty() {
            self.api.user_agent = default_user_agent();
        }
        if self.search.result_count == 0 {
            self.search.result_count = default_result_count();
        }
        if self.forecast.hourly_days == 0 {
            self.forecast.hourly_days = default_hourly_days();
        }
        if self.forecast.daily_days == 0 {
            self.forecast.daily_days = default_daily_days();
        }
        if self.overlay.default_category.is_empty() {
            self.overlay.default_category = default_overlay_category();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// The overlay category selected on mount
    pub fn default_overlay(&self) -> Result<OverlayCategory> {
        self.overlay
            .default_category
            .parse::<OverlayCategory>()
            .map_err(Into::into)
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.api.timeout_seconds > 300 {
            return Err(ExplorerError::config("API timeout cannot exceed 300 seconds").into());
        }

        if self.search.result_count > 100 {
            return Err(ExplorerError::config("Search result count cannot exceed 100").into());
        }

        // Open-Meteo serves at most 16 forecast days
        if self.forecast.hourly_days > 16 || self.forecast.daily_days > 16 {
            return Err(ExplorerError::config("Forecast days cannot exceed 16").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ExplorerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ExplorerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for url in [&self.api.forecast_base_url, &self.api.geocoding_base_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ExplorerError::config(format!(
                    "API base URL must be a valid HTTP or HTTPS URL, got '{url}'"
                ))
                .into());
            }
        }

        self.default_overlay()
            .with_context(|| "Invalid overlay.default_category")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ExplorerConfig::default();
        assert_eq!(config.api.forecast_base_url, "https://api.open-meteo.com/v1");
        assert_eq!(
            config.api.geocoding_base_url,
            "https://geocoding-api.open-meteo.com/v1"
        );
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.search.initial_location, "London");
        assert_eq!(config.search.result_count, 5);
        assert_eq!(config.forecast.hourly_days, 3);
        assert_eq!(config.forecast.daily_days, 7);
        assert_eq!(config.logging.level, "info");
        assert!(config.overlay.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = ExplorerConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = ExplorerConfig::default();
        config.api.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = ExplorerConfig::default();
        config.forecast.daily_days = 17;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_unknown_overlay() {
        let mut config = ExplorerConfig::default();
        config.overlay.default_category = "humidity".to_string();
        assert!(config.validate().is_err());

        config.overlay.default_category = "wind".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_overlay().unwrap(), OverlayCategory::Wind);
    }

    #[test]
    fn test_apply_defaults_fills_zeroes() {
        let mut config = ExplorerConfig::default();
        config.api.timeout_seconds = 0;
        config.search.result_count = 0;
        config.logging.format = String::new();
        config.apply_defaults();
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.search.result_count, 5);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[api]
forecast_base_url = "http://localhost:9000/v1"

[search]
initial_location = "Paris"
result_count = 3

[overlay]
default_category = "clouds"
seed = 42
"#
        )
        .unwrap();

        let config = ExplorerConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.api.forecast_base_url, "http://localhost:9000/v1");
        assert_eq!(
            config.api.geocoding_base_url,
            "https://geocoding-api.open-meteo.com/v1"
        );
        assert_eq!(config.search.initial_location, "Paris");
        assert_eq!(config.search.result_count, 3);
        assert_eq!(config.overlay.seed, Some(42));
        assert_eq!(config.default_overlay().unwrap(), OverlayCategory::Clouds);
    }

    #[test]
    fn test_environment_variable_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[api]\ntimeout_seconds = 20\n").unwrap();

        // SAFETY: no other test reads or writes this variable
        unsafe {
            std::env::set_var("WEATHER_EXPLORER__API__TIMEOUT_SECONDS", "10");
        }
        let result = ExplorerConfig::load_from_path(Some(file.path().to_path_buf()));
        // SAFETY: test cleanup
        unsafe {
            std::env::remove_var("WEATHER_EXPLORER__API__TIMEOUT_SECONDS");
        }

        let config = result.unwrap();
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.search.initial_location, "London");
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = ExplorerConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("weather-explorer"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
