//! Configuration management for `WeatherSite`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings. The resulting
//! [`WeatherSiteConfig`] is built once at startup and passed explicitly to
//! the provider clients and the search session.

use crate::WeatherSiteError;
use anyhow::{Context, Result};
use chrono::Locale;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variables the browser build read its keys from
const LEGACY_PLACES_KEY_VAR: &str = "VITE_GOOGLE_PLACES_API_KEY";
const LEGACY_FORECAST_KEY_VAR: &str = "VITE_WEATHER_API_KEY";

/// Root configuration structure for the `WeatherSite` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSiteConfig {
    /// Place autocomplete and details provider
    pub places: PlacesConfig,
    /// Daily forecast provider
    pub forecast: ForecastConfig,
    /// Outbound HTTP settings
    pub http: HttpConfig,
    /// Presentation settings
    pub display: DisplayConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Place provider (Google Places) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    /// API key, required
    pub api_key: Option<String>,
    /// Base URL for the place API
    pub base_url: String,
}

/// Forecast provider (Weatherbit) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// API key, required
    pub api_key: Option<String>,
    /// Base URL for the forecast API
    pub base_url: String,
    /// Number of daily records requested
    pub days: u8,
}

/// Outbound HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u32,
}

/// Presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Locale used for weekday names, e.g. `en_US`
    pub locale: String,
    /// Base URL weather icon codes are appended to
    pub icon_base_url: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_places_base_url() -> String {
    "https://maps.googleapis.com/maps/api/place".to_string()
}

fn default_forecast_base_url() -> String {
    "https://api.weatherbit.io/v2.0".to_string()
}

fn default_forecast_days() -> u8 {
    7
}

fn default_timeout() -> u32 {
    30
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_icon_base_url() -> String {
    "https://www.weatherbit.io/static/img/icons".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_places_base_url(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_forecast_base_url(),
            days: default_forecast_days(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            icon_base_url: default_icon_base_url(),
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

impl WeatherSiteConfig {
    /// Build a configuration from the two required credentials, everything else defaulted
    #[must_use]
    pub fn with_keys(places_api_key: impl Into<String>, forecast_api_key: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.places.api_key = Some(places_api_key.into());
        config.forecast.api_key = Some(forecast_api_key.into());
        config
    }

    /// Load configuration from `config_path` or the default locations,
    /// then environment variables
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. WEATHERSITE_PLACES__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("WEATHERSITE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WeatherSiteConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_legacy_env();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weathersite").join("config.toml"))
    }

    /// Fill missing keys from the variable names the browser build used
    fn apply_legacy_env(&mut self) {
        if self.places.api_key.is_none() {
            self.places.api_key = std::env::var(LEGACY_PLACES_KEY_VAR).ok();
        }
        if self.forecast.api_key.is_none() {
            self.forecast.api_key = std::env::var(LEGACY_FORECAST_KEY_VAR).ok();
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.places.base_url.is_empty() {
            self.places.base_url = default_places_base_url();
        }
        if self.forecast.base_url.is_empty() {
            self.forecast.base_url = default_forecast_base_url();
        }
        if self.forecast.days == 0 {
            self.forecast.days = default_forecast_days();
        }
        if self.http.timeout_seconds == 0 {
            self.http.timeout_seconds = default_timeout();
        }
        if self.display.locale.is_empty() {
            self.display.locale = default_locale();
        }
        if self.display.icon_base_url.is_empty() {
            self.display.icon_base_url = default_icon_base_url();
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
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        validate_key("Places", self.places.api_key.as_deref())?;
        validate_key("Forecast", self.forecast.api_key.as_deref())?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.timeout_seconds > 300 {
            return Err(
                WeatherSiteError::config("HTTP timeout cannot exceed 300 seconds").into(),
            );
        }

        if !(1..=16).contains(&self.forecast.days) {
            return Err(WeatherSiteError::config(
                "Forecast days must be between 1 and 16",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherSiteError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherSiteError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Places API base URL", &self.places.base_url),
            ("Forecast API base URL", &self.forecast.base_url),
            ("Icon base URL", &self.display.icon_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WeatherSiteError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        self.locale()?;

        Ok(())
    }

    /// Parsed display locale
    pub fn locale(&self) -> Result<Locale> {
        Locale::try_from(self.display.locale.as_str()).map_err(|_| {
            WeatherSiteError::config(format!("Unknown locale '{}'", self.display.locale)).into()
        })
    }

    /// Request timeout as a `Duration`
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds.into())
    }
}

fn validate_key(provider: &str, key: Option<&str>) -> Result<()> {
    let Some(key) = key else {
        return Err(WeatherSiteError::config(format!(
            "{provider} API key is required. Set it in the config file or the environment."
        ))
        .into());
    };

    if key.trim().is_empty() {
        return Err(
            WeatherSiteError::config(format!("{provider} API key cannot be empty")).into(),
        );
    }

    if key.len() < 8 {
        return Err(WeatherSiteError::config(format!(
            "{provider} API key appears to be invalid (too short). Please check your API key."
        ))
        .into());
    }

    if key.len() > 100 {
        return Err(WeatherSiteError::config(format!(
            "{provider} API key appears to be invalid (too long). Please check your API key."
        ))
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> WeatherSiteConfig {
        WeatherSiteConfig::with_keys("places_key_123", "weather_key_123")
    }

    #[test]
    fn test_default_config() {
        let config = WeatherSiteConfig::default();
        assert_eq!(
            config.places.base_url,
            "https://maps.googleapis.com/maps/api/place"
        );
        assert_eq!(config.forecast.base_url, "https://api.weatherbit.io/v2.0");
        assert_eq!(config.forecast.days, 7);
        assert_eq!(config.http.timeout_seconds, 30);
        assert_eq!(config.display.locale, "en_US");
        assert_eq!(config.logging.level, "info");
        assert!(config.places.api_key.is_none());
        assert!(config.forecast.api_key.is_none());
    }

    #[test]
    fn test_config_validation_missing_api_key() {
        let config = WeatherSiteConfig::default();
        let result = config.validate_api_keys();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Places API key is required"));
    }

    #[test]
    fn test_config_validation_missing_forecast_key() {
        let mut config = valid_config();
        config.forecast.api_key = None;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Forecast API key is required"));
    }

    #[test]
    fn test_config_validation_short_key() {
        let mut config = valid_config();
        config.places.api_key = Some("abc".to_string());
        let result = config.validate_api_keys();
        assert!(result.unwrap_err().to_string().contains("too short"));
    }

    #[test]
    fn test_config_validation_valid() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = valid_config();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = valid_config();
        config.http.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = valid_config();
        config.forecast.days = 30;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Forecast days"));
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = valid_config();
        config.forecast.base_url = "api.weatherbit.io".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("HTTP or HTTPS"));
    }

    #[test]
    fn test_locale_parsing() {
        let mut config = valid_config();
        assert!(matches!(config.locale().unwrap(), Locale::en_US));

        config.display.locale = "de_DE".to_string();
        assert!(matches!(config.locale().unwrap(), Locale::de_DE));

        config.display.locale = "xx_YY".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = valid_config();
        config.forecast.days = 0;
        config.http.timeout_seconds = 0;
        config.display.locale = String::new();
        config.apply_defaults();
        assert_eq!(config.forecast.days, 7);
        assert_eq!(config.http.timeout_seconds, 30);
        assert_eq!(config.display.locale, "en_US");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[places]
api_key = "file_places_key"

[forecast]
api_key = "file_weather_key"
days = 5

[display]
locale = "fr_FR"
"#
        )
        .unwrap();

        let config = WeatherSiteConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.forecast.days, 5);
        assert_eq!(config.display.locale, "fr_FR");
        assert_eq!(
            config.places.base_url,
            "https://maps.googleapis.com/maps/api/place"
        );
        assert!(config.places.api_key.is_some());
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = WeatherSiteConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("weathersite"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
