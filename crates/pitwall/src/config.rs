//! Configuration management for pitwall.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "pitwall";

/// Backend base URLs must be absolute http(s) URLs without a trailing slash.
const BASE_URL_PATTERN: &str = r"^https?://[^\s/]+(/[^\s]*[^\s/])?$";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `PITWALL_`)
/// 2. TOML config file at `~/.config/pitwall/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend client configuration.
    pub api: ApiConfig,
    /// Insight thresholds.
    pub insights: InsightConfig,
    /// Telemetry preprocessing configuration.
    pub telemetry: TelemetryConfig,
}

/// Backend client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the telemetry backend.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Thresholds used by the insight generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Maximum number of bullets per generator.
    pub max_insights: usize,
    /// Minimum top-speed difference worth reporting, km/h.
    pub top_speed_threshold_kmh: f64,
    /// Minimum slowest-corner speed difference worth reporting, km/h.
    pub corner_speed_threshold_kmh: f64,
    /// Minimum braking-distance difference worth reporting, meters.
    pub brake_distance_threshold_m: f64,
    /// Throttle value counted as full throttle.
    pub full_throttle_pct: f64,
    /// Minimum delta advantage worth reporting, seconds.
    pub delta_advantage_threshold_s: f64,
    /// Minimum stint length considered for tire management.
    pub min_stint_laps: u32,
}

/// Telemetry preprocessing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Brake value above which a percentage-mode sample counts as braking.
    pub brake_percentage_threshold: f64,
    /// Target number of points when downsampling for charts.
    pub downsample_target: usize,
    /// Points on the shared distance grid. 0 uses the longer lap's length.
    pub align_points: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            max_insights: 4,
            top_speed_threshold_kmh: 2.0,
            corner_speed_threshold_kmh: 3.0,
            brake_distance_threshold_m: 50.0,
            full_throttle_pct: 95.0,
            delta_advantage_threshold_s: 0.05,
            min_stint_laps: 5,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            brake_percentage_threshold: 10.0,
            downsample_target: 500,
            align_points: 0,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `PITWALL_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("PITWALL_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        // Validate api config
        let url_pattern = Regex::new(BASE_URL_PATTERN)
            .map_err(|e| Error::config_validation(format!("bad base_url pattern: {e}")))?;
        if !url_pattern.is_match(&self.api.base_url) {
            return Err(Error::config_validation(format!(
                "invalid base_url: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(Error::config_validation(
                "timeout_secs must be greater than 0",
            ));
        }

        // Validate insight config
        if self.insights.max_insights == 0 {
            return Err(Error::config_validation(
                "max_insights must be greater than 0",
            ));
        }

        let thresholds = [
            ("top_speed_threshold_kmh", self.insights.top_speed_threshold_kmh),
            (
                "corner_speed_threshold_kmh",
                self.insights.corner_speed_threshold_kmh,
            ),
            (
                "brake_distance_threshold_m",
                self.insights.brake_distance_threshold_m,
            ),
            ("full_throttle_pct", self.insights.full_throttle_pct),
            (
                "delta_advantage_threshold_s",
                self.insights.delta_advantage_threshold_s,
            ),
            (
                "brake_percentage_threshold",
                self.telemetry.brake_percentage_threshold,
            ),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::config_validation(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        // Validate telemetry config
        if self.telemetry.downsample_target < 2 {
            return Err(Error::config_validation(format!(
                "downsample_target must be at least 2, got {}",
                self.telemetry.downsample_target
            )));
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
        let config = Config::default();

        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.insights.max_insights, 4);
        assert_eq!(config.telemetry.downsample_target, 500);
    }

    #[test]
    fn test_default_insight_config() {
        let insights = InsightConfig::default();

        assert!((insights.top_speed_threshold_kmh - 2.0).abs() < f64::EPSILON);
        assert!((insights.corner_speed_threshold_kmh - 3.0).abs() < f64::EPSILON);
        assert!((insights.brake_distance_threshold_m - 50.0).abs() < f64::EPSILON);
        assert!((insights.full_throttle_pct - 95.0).abs() < f64::EPSILON);
        assert!((insights.delta_advantage_threshold_s - 0.05).abs() < f64::EPSILON);
        assert_eq!(insights.min_stint_laps, 5);
    }

    #[test]
    fn test_default_telemetry_config() {
        let telemetry = TelemetryConfig::default();

        assert!((telemetry.brake_percentage_threshold - 10.0).abs() < f64::EPSILON);
        assert_eq!(telemetry.align_points, 0);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_base_url_with_path() {
        let mut config = Config::default();
        config.api.base_url = "https://f1.example.com/api/v1".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_base_url() {
        let mut config = Config::default();
        config.api.base_url = "localhost:8000".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("base_url"));
    }

    #[test]
    fn test_validate_trailing_slash_rejected() {
        let mut config = Config::default();
        config.api.base_url = "http://localhost:8000/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.api.timeout_secs = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("timeout_secs"));
    }

    #[test]
    fn test_validate_zero_max_insights() {
        let mut config = Config::default();
        config.insights.max_insights = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_insights"));
    }

    #[test]
    fn test_validate_negative_threshold() {
        let mut config = Config::default();
        config.insights.delta_advantage_threshold_s = -0.1;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("delta_advantage_threshold_s"));
    }

    #[test]
    fn test_validate_small_downsample_target() {
        let mut config = Config::default();
        config.telemetry.downsample_target = 1;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("downsample_target"));
    }

    #[test]
    fn test_request_timeout() {
        let config = Config::default();
        assert_eq!(config.api.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("pitwall"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());

        let config = result.unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"http://telemetry.local:9000\"\n\n[insights]\nmax_insights = 3"
        )
        .unwrap();

        let config = Config::load_from(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.api.base_url, "http://telemetry.local:9000");
        assert_eq!(config.insights.max_insights, 3);
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\ntimeout_secs = 0").unwrap();

        let result = Config::load_from(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));
    }

    #[test]
    fn test_insight_config_deserialize() {
        let json = r#"{"max_insights": 2, "min_stint_laps": 8}"#;
        let insights: InsightConfig = serde_json::from_str(json).unwrap();
        assert_eq!(insights.max_insights, 2);
        assert_eq!(insights.min_stint_laps, 8);
        assert!((insights.full_throttle_pct - 95.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("base_url"));
        assert!(json.contains("downsample_target"));
    }
}
