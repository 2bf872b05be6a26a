use crate::core::pair::CurrencyPair;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            base_url: "http://localhost:5000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "default_history_period")]
    pub period: String,
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            period: default_history_period(),
            limit: default_history_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ForecastConfig {
    #[serde(default = "default_forecast_model")]
    pub model: String,
    #[serde(default = "default_forecast_horizon")]
    pub horizon: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        ForecastConfig {
            model: default_forecast_model(),
            horizon: default_forecast_horizon(),
        }
    }
}

fn default_history_period() -> String {
    "24h".to_string()
}

fn default_history_limit() -> usize {
    20
}

fn default_forecast_model() -> String {
    "ensemble".to_string()
}

fn default_forecast_horizon() -> usize {
    12
}

fn default_tracked_pair() -> CurrencyPair {
    CurrencyPair::UsdEur
}

fn default_refresh_interval() -> u64 {
    30
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default = "default_tracked_pair")]
    pub tracked_pair: CurrencyPair,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            service: ServiceConfig::default(),
            tracked_pair: default_tracked_pair(),
            refresh_interval_secs: default_refresh_interval(),
            history: HistoryConfig::default(),
            forecast: ForecastConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file found, using defaults");
            return Ok(AppConfig::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "fxsync")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
service:
  base_url: "http://example.com"
tracked_pair: "EUR/JPY"
refresh_interval_secs: 10
history:
  period: "12h"
  limit: 50
forecast:
  model: "ensemble"
  horizon: 24
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.service.base_url, "http://example.com");
        assert_eq!(config.tracked_pair, CurrencyPair::EurJpy);
        assert_eq!(config.refresh_interval_secs, 10);
        assert_eq!(config.history.period, "12h");
        assert_eq!(config.history.limit, 50);
        assert_eq!(config.forecast.horizon, 24);
    }

    #[test]
    fn test_config_defaults_fill_missing_sections() {
        let config: AppConfig = serde_yaml::from_str("service:\n  base_url: \"http://x\"\n")
            .expect("Failed to deserialize");
        assert_eq!(config.tracked_pair, CurrencyPair::UsdEur);
        assert_eq!(config.refresh_interval_secs, 30);
        assert_eq!(config.history.period, "24h");
        assert_eq!(config.history.limit, 20);
        assert_eq!(config.forecast.model, "ensemble");
        assert_eq!(config.forecast.horizon, 12);
    }
}
