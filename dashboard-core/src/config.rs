use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::model::DEFAULT_HOURLY_HOURS;

pub const API_KEY_ENV: &str = "WEATHER_API_KEY";
pub const BASE_URL_ENV: &str = "WEATHER_API_BASE_URL";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_location = "Krishnanagar"
/// debounce_ms = 500
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// WeatherAPI.com key. `WEATHER_API_KEY` wins over the file.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Searched once on startup when set.
    #[serde(default)]
    pub default_location: Option<String>,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Largest horizon the dashboard offers.
    #[serde(default = "default_max_forecast_days")]
    pub max_forecast_days: u8,

    #[serde(default = "default_forecast_days")]
    pub default_forecast_days: u8,

    #[serde(default = "default_hourly_hours")]
    pub default_hourly_hours: usize,
}

fn default_base_url() -> String {
    "https://api.weatherapi.com/v1".to_string()
}

const fn default_debounce_ms() -> u64 {
    500
}

const fn default_request_timeout_secs() -> u64 {
    10
}

const fn default_max_forecast_days() -> u8 {
    3
}

const fn default_forecast_days() -> u8 {
    3
}

const fn default_hourly_hours() -> usize {
    DEFAULT_HOURLY_HOURS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_location: None,
            debounce_ms: default_debounce_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            max_forecast_days: default_max_forecast_days(),
            default_forecast_days: default_forecast_days(),
            default_hourly_hours: default_hourly_hours(),
        }
    }
}

impl Config {
    /// Load config from disk, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load only what is on disk, or an empty default if the file doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values from the hosting environment. Empty variables are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(url) = non_empty(BASE_URL_ENV) {
            self.base_url = url;
        }
    }

    /// The API key, or an error that tells the user how to provide one.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            anyhow!(
                "No WeatherAPI key configured.\n\
                 Hint: run `weather-dashboard configure` or set {API_KEY_ENV}."
            )
        })
    }

    /// Validate the numeric knobs, so the controller never sees a zero horizon.
    pub fn validate(&self) -> Result<()> {
        if self.max_forecast_days == 0 {
            return Err(anyhow!("max_forecast_days must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be at least 1"));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        assert!(err.to_string().contains("No WeatherAPI key configured"));
        assert!(err.to_string().contains("weather-dashboard configure"));
    }

    #[test]
    fn env_key_overrides_file_key() {
        let mut cfg = Config { api_key: Some("FILE_KEY".into()), ..Config::default() };

        cfg.apply_env_overrides(env(&[(API_KEY_ENV, "ENV_KEY")]));

        assert_eq!(cfg.api_key().expect("key must exist"), "ENV_KEY");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut cfg = Config { api_key: Some("FILE_KEY".into()), ..Config::default() };

        cfg.apply_env_overrides(env(&[(API_KEY_ENV, "  "), (BASE_URL_ENV, "")]));

        assert_eq!(cfg.api_key().expect("key must exist"), "FILE_KEY");
        assert_eq!(cfg.base_url, "https://api.weatherapi.com/v1");
    }

    #[test]
    fn base_url_can_come_from_env() {
        let mut cfg = Config::default();
        cfg.apply_env_overrides(env(&[(BASE_URL_ENV, "http://localhost:9000/v1")]));

        assert_eq!(cfg.base_url, "http://localhost:9000/v1");
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg: Config = toml::from_str("api_key = \"K\"\ndebounce_ms = 250\n").expect("parse");

        assert_eq!(cfg.api_key.as_deref(), Some("K"));
        assert_eq!(cfg.debounce(), Duration::from_millis(250));
        assert_eq!(cfg.max_forecast_days, 3);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.default_hourly_hours, 12);
    }

    #[test]
    fn saved_toml_round_trips() {
        let cfg = Config {
            api_key: Some("K".into()),
            default_location: Some("Krishnanagar".into()),
            ..Config::default()
        };

        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let back: Config = toml::from_str(&text).expect("parse");

        assert_eq!(back.default_location.as_deref(), Some("Krishnanagar"));
        assert_eq!(back.base_url, cfg.base_url);
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let cfg = Config { max_forecast_days: 0, ..Config::default() };
        assert!(cfg.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }
}
