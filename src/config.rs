//! Configuration management for the `SkyCast` forecaster
//!
//! Handles loading configuration from an optional TOML file and environment
//! variables, and validates the resulting settings.

use crate::SkycastError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkycastConfig {
    /// The single location this instance forecasts for
    #[serde(default)]
    pub location: LocationConfig,
    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// History archive location
    #[serde(default)]
    pub storage: StorageConfig,
    /// Rolling history and model settings
    #[serde(default)]
    pub predictor: PredictorConfig,
    /// HTTP server binding
    #[serde(default)]
    pub server: ServerConfig,
    /// Console driver loop timing
    #[serde(default)]
    pub driver: DriverConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    /// IANA timezone passed to the weather API
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL for the live endpoint (`/forecast` is appended)
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Full URL of the archive endpoint
    #[serde(default = "default_archive_url")]
    pub archive_url: String,
    /// Request timeout in seconds; unset leaves the transport default
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    /// Minimum spacing between live requests in milliseconds
    #[serde(default = "default_min_api_interval")]
    pub min_api_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
}

/// Rolling history and model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Capacity of the observation store
    #[serde(default = "default_max_readings")]
    pub max_readings: usize,
    /// Readings required before training is attempted
    #[serde(default = "default_min_training_readings")]
    pub min_training_readings: usize,
    /// Days of archive history downloaded at startup
    #[serde(default = "default_history_days")]
    pub history_days: u32,
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
    /// Fraction of a field's standard deviation used as noise spread
    #[serde(default = "default_noise_factor")]
    pub noise_factor: f64,
    /// Trees per random forest
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    /// Seed for forest bootstrap sampling
    #[serde(default = "default_seed")]
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Pause between fetch/forecast cycles
    #[serde(default = "default_update_interval")]
    pub update_interval_seconds: u64,
    /// Pause after a failed cycle
    #[serde(default = "default_error_pause")]
    pub error_pause_seconds: u64,
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
fn default_city() -> String {
    "Kolkata".to_string()
}

fn default_latitude() -> f64 {
    22.5726
}

fn default_longitude() -> f64 {
    88.3639
}

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_archive_url() -> String {
    "https://archive-api.open-meteo.com/v1/archive".to_string()
}

fn default_min_api_interval() -> u64 {
    1000
}

fn default_history_path() -> PathBuf {
    PathBuf::from("data").join("historical_weather_data.csv")
}

fn default_max_readings() -> usize {
    720
}

fn default_min_training_readings() -> usize {
    240
}

fn default_history_days() -> u32 {
    30
}

fn default_forecast_days() -> u32 {
    7
}

fn default_noise_factor() -> f64 {
    0.2
}

fn default_n_estimators() -> usize {
    100
}

fn default_seed() -> u64 {
    42
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_update_interval() -> u64 {
    300
}

fn default_error_pause() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            city: default_city(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            timezone: default_timezone(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            archive_url: default_archive_url(),
            timeout_seconds: None,
            min_api_interval_ms: default_min_api_interval(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
        }
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            max_readings: default_max_readings(),
            min_training_readings: default_min_training_readings(),
            history_days: default_history_days(),
            forecast_days: default_forecast_days(),
            noise_factor: default_noise_factor(),
            n_estimators: default_n_estimators(),
            seed: default_seed(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            update_interval_seconds: default_update_interval(),
            error_pause_seconds: default_error_pause(),
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

impl Default for SkycastConfig {
    fn default() -> Self {
        Self {
            location: LocationConfig::default(),
            weather: WeatherConfig::default(),
            storage: StorageConfig::default(),
            predictor: PredictorConfig::default(),
            server: ServerConfig::default(),
            driver: DriverConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl WeatherConfig {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    #[must_use]
    pub fn min_api_interval(&self) -> Duration {
        Duration::from_millis(self.min_api_interval_ms)
    }
}

impl SkycastConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(std::env::var_os("SKYCAST_CONFIG").map(PathBuf::from))
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("skycast.toml"));

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // SKYCAST_LOCATION__CITY=Berlin style overrides
        builder = builder.add_source(
            Environment::with_prefix("SKYCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: SkycastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_location()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_location(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.location.latitude) {
            return Err(SkycastError::config("Latitude must be between -90 and 90").into());
        }
        if !(-180.0..=180.0).contains(&self.location.longitude) {
            return Err(SkycastError::config("Longitude must be between -180 and 180").into());
        }
        if self.location.timezone.trim().is_empty() {
            return Err(SkycastError::config("Timezone cannot be empty").into());
        }
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let predictor = &self.predictor;

        if self.weather.timeout_seconds.is_some_and(|t| t == 0 || t > 300) {
            return Err(
                SkycastError::config("Weather API timeout must be between 1 and 300 seconds").into(),
            );
        }

        if predictor.max_readings == 0 {
            return Err(SkycastError::config("max_readings must be positive").into());
        }

        if predictor.min_training_readings == 0
            || predictor.min_training_readings > predictor.max_readings
        {
            return Err(SkycastError::config(format!(
                "min_training_readings must be between 1 and max_readings ({})",
                predictor.max_readings
            ))
            .into());
        }

        if predictor.history_days == 0 || predictor.forecast_days == 0 {
            return Err(
                SkycastError::config("history_days and forecast_days must be positive").into(),
            );
        }

        if !predictor.noise_factor.is_finite() || predictor.noise_factor < 0.0 {
            return Err(
                SkycastError::config("noise_factor must be a non-negative number").into(),
            );
        }

        if predictor.n_estimators == 0 {
            return Err(SkycastError::config("n_estimators must be positive").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SkycastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(SkycastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for url in [&self.weather.base_url, &self.weather.archive_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SkycastError::config(format!(
                    "Weather API URL '{url}' must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
