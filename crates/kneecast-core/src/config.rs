use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable consulted for the fallback geocoder's app id.
pub const FALLBACK_APP_ID_ENV: &str = "YAHOO_CLIENT_ID";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Geocoding, weather and cache settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Local storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the primary geocoding server (`GET /geocode`)
    #[serde(default = "default_server_url")]
    pub geocoder_url: String,

    /// Base URL of the weather server (`GET /weather`)
    #[serde(default = "default_server_url")]
    pub weather_url: String,

    /// Base URL of the legacy fallback geocoder
    #[serde(default = "default_fallback_geocoder_url")]
    pub fallback_geocoder_url: String,

    /// App id for the fallback geocoder. The fallback is only used when set.
    #[serde(default)]
    pub fallback_app_id: Option<String>,

    /// How long a fetched forecast is served from memory
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u32,

    /// Per-request timeout for all outbound HTTP calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_server_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_fallback_geocoder_url() -> String {
    "https://map.yahooapis.jp".to_string()
}

fn default_cache_ttl_minutes() -> u32 {
    10
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocoder_url: default_server_url(),
            weather_url: default_server_url(),
            fallback_geocoder_url: default_fallback_geocoder_url(),
            fallback_app_id: None,
            cache_ttl_minutes: default_cache_ttl_minutes(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl WeatherConfig {
    /// App id from the config file, or from the environment if the file has none.
    pub fn effective_fallback_app_id(&self) -> Option<String> {
        self.fallback_app_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .or_else(|| {
                std::env::var(FALLBACK_APP_ID_ENV)
                    .ok()
                    .filter(|id| !id.trim().is_empty())
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Saved-address database; defaults to `<config_dir>/addresses.db`
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kneecast");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, writing defaults there if missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if the file is unreadable or validation fails.
    pub fn load_validated() -> Result<(Self, ValidationResult), ConfigError> {
        let config = Self::load().map_err(|e| ConfigError::ParseError(format!("{:#}", e)))?;
        let validation = config.checked()?;
        Ok((config, validation))
    }

    /// Validate and log warnings, failing on any error.
    pub fn checked(&self) -> Result<ValidationResult, ConfigError> {
        let validation = self.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(validation)
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.geocoder_url, "weather.geocoder_url", &mut result);
        self.validate_url(&self.weather.weather_url, "weather.weather_url", &mut result);
        self.validate_url(
            &self.weather.fallback_geocoder_url,
            "weather.fallback_geocoder_url",
            &mut result,
        );

        if self.weather.effective_fallback_app_id().is_none() {
            result.add_warning(
                "weather.fallback_app_id",
                "Fallback geocoder not configured - only the primary geocoder will be used",
            );
        }

        if self.weather.cache_ttl_minutes == 0 {
            result.add_warning(
                "weather.cache_ttl_minutes",
                "Forecast caching disabled (0 minutes)",
            );
        } else if self.weather.cache_ttl_minutes > 1440 {
            result.add_warning(
                "weather.cache_ttl_minutes",
                "Forecast cache lifetime is more than 24 hours",
            );
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if let Some(path) = &self.storage.database_path {
            if path.is_dir() {
                result.add_error(
                    "storage.database_path",
                    format!("Path is a directory: {}", path.display()),
                );
            }
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Where saved addresses live.
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| self.config_dir.join("addresses.db"))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("kneecast");

        Ok(config_dir.join("config.toml"))
    }
}
