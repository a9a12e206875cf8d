/// Service configuration loader - wxload.toml + environment.
///
/// Separates run parameters (location, lookback window, table names,
/// retry delay) from code, and keeps credentials out of both: the
/// database URL and Telegram credentials come from the environment
/// (via .env), never from the TOML file or source literals.

use serde::Deserialize;
use std::env;
use std::fs;

/// Configuration load/validation error
#[derive(Debug)]
pub enum ConfigError {
    /// wxload.toml missing or unreadable
    ReadFailed(String),
    /// wxload.toml present but malformed
    ParseFailed(String),
    /// A field failed range validation
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadFailed(msg) => write!(f, "failed to read wxload.toml: {}", msg),
            ConfigError::ParseFailed(msg) => write!(f, "failed to parse wxload.toml: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Telegram notification credentials, sourced from the environment.
/// Absent credentials disable the notification side-channel; the run
/// itself is unaffected.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

/// Full service configuration, passed into each component at construction.
#[derive(Debug, Clone)]
pub struct Config {
    // Geographic point the archive is queried for
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,

    // Gap detection window and retry behavior
    pub lookback_days: u32,
    pub retry_delay_seconds: u64,

    // Upstream API
    pub api_base_url: String,
    pub api_timeout_seconds: u64,

    // Store tables (schema-qualified)
    pub bronze_table: String,
    pub silver_table: String,

    // Run summary artifact
    pub summary_path: String,

    pub telegram: Option<TelegramConfig>,
}

/// TOML file shape. Credentials are deliberately not representable here.
#[derive(Debug, Deserialize)]
struct FileConfig {
    latitude: f64,
    longitude: f64,
    timezone: String,
    lookback_days: u32,
    retry_delay_seconds: u64,
    api_base_url: String,
    api_timeout_seconds: u64,
    bronze_table: String,
    silver_table: String,
    summary_path: String,
}

impl Config {
    /// Loads configuration from `wxload.toml` in the current working
    /// directory plus `TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHAT_ID` from the
    /// environment (.env is loaded first if present).
    pub fn load() -> Result<Config, ConfigError> {
        dotenv::dotenv().ok();

        let contents = fs::read_to_string("wxload.toml")
            .map_err(|e| ConfigError::ReadFailed(e.to_string()))?;

        let file: FileConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;

        let telegram = match (env::var("TELEGRAM_BOT_TOKEN"), env::var("TELEGRAM_CHAT_ID")) {
            (Ok(bot_token), Ok(chat_id)) if !bot_token.is_empty() && !chat_id.is_empty() => {
                Some(TelegramConfig { bot_token, chat_id })
            }
            _ => None,
        };

        let config = Config {
            latitude: file.latitude,
            longitude: file.longitude,
            timezone: file.timezone,
            lookback_days: file.lookback_days,
            retry_delay_seconds: file.retry_delay_seconds,
            api_base_url: file.api_base_url,
            api_timeout_seconds: file.api_timeout_seconds,
            bronze_table: file.bronze_table,
            silver_table: file.silver_table,
            summary_path: file.summary_path,
            telegram,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ConfigError::Invalid(format!(
                "latitude {} out of range [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ConfigError::Invalid(format!(
                "longitude {} out of range [-180, 180]",
                self.longitude
            )));
        }
        if self.lookback_days == 0 {
            return Err(ConfigError::Invalid(
                "lookback_days must be at least 1".to_string(),
            ));
        }
        if self.bronze_table.is_empty() || self.silver_table.is_empty() {
            return Err(ConfigError::Invalid(
                "bronze_table and silver_table must be set".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    /// Reference configuration for the Athens, GA monitoring point.
    /// Used by tests; production runs load wxload.toml.
    fn default() -> Self {
        Config {
            latitude: 33.9519,
            longitude: -83.3576,
            timezone: "UTC".to_string(),
            lookback_days: 10,
            retry_delay_seconds: 600,
            api_base_url: "https://archive-api.open-meteo.com/v1/archive".to_string(),
            api_timeout_seconds: 60,
            bronze_table: "weather.bronze_weather_hourly_raw".to_string(),
            silver_table: "weather.silver_weather_hourly".to_string(),
            summary_path: "last_run_summary.txt".to_string(),
            telegram: None,
        }
    }
}
