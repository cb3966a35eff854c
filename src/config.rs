//! Dashboard configuration

use crate::error::DashboardError;
use crate::loader::DEFAULT_DELIMITER;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default dataset location, relative to the working directory
pub const DEFAULT_DATA_PATH: &str = "digital_diet_mental_health.csv";

/// Environment variable that overrides the dataset location
pub const DATA_PATH_ENV: &str = "LIFESTYLE_DATA_PATH";

/// Bounds and default for one user input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl InputRange {
    pub const fn new(min: f64, max: f64, default: f64) -> Self {
        Self { min, max, default }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Move a value into `[min, max]`.
    ///
    /// # Errors
    /// `ConfigError` when the bounds are not finite or `min > max`.
    pub fn clamp(&self, value: f64) -> Result<f64, DashboardError> {
        self.check_bounds("input")?;
        Ok(value.clamp(self.min, self.max))
    }

    fn check_bounds(&self, name: &str) -> Result<(), DashboardError> {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(DashboardError::ConfigError(format!(
                "{name} range must be finite"
            )));
        }
        if self.min > self.max {
            return Err(DashboardError::ConfigError(format!(
                "{name} range has min {} greater than max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    fn validate(&self, name: &str) -> Result<(), DashboardError> {
        self.check_bounds(name)?;
        if !self.default.is_finite() {
            return Err(DashboardError::ConfigError(format!(
                "{name} default must be finite"
            )));
        }
        if !self.contains(self.default) {
            return Err(DashboardError::ConfigError(format!(
                "{name} default {} is outside [{}, {}]",
                self.default, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Configuration for a dashboard session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Path to the delimited dataset
    pub data_path: PathBuf,
    /// Field delimiter
    pub delimiter: char,
    /// Screen time input range (hours)
    pub screen_time: InputRange,
    /// Caffeine input range (mg/day)
    pub caffeine: InputRange,
    /// Clamp estimate inputs to their ranges before predicting
    pub clamp_inputs: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            delimiter: DEFAULT_DELIMITER as char,
            screen_time: InputRange::new(0.0, 15.0, 5.0),
            caffeine: InputRange::new(0.0, 800.0, 200.0),
            clamp_inputs: false,
        }
    }
}

impl DashboardConfig {
    /// Default configuration pointing at a specific dataset
    pub fn with_data_path(path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: path.into(),
            ..Self::default()
        }
    }

    /// Parse configuration from JSON; absent fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, DashboardError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DashboardError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            DashboardError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, DashboardError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Apply overrides from the environment
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(path) = std::env::var_os(DATA_PATH_ENV).filter(|p| !p.is_empty()) {
            self.data_path = PathBuf::from(path);
        }
        self
    }

    /// Delimiter as a single byte
    pub fn delimiter_byte(&self) -> Result<u8, DashboardError> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                DashboardError::ConfigError(format!(
                    "delimiter {:?} must be a single ASCII character",
                    self.delimiter
                ))
            })
    }

    pub fn validate(&self) -> Result<(), DashboardError> {
        self.screen_time.validate("screen_time")?;
        self.caffeine.validate("caffeine")?;
        self.delimiter_byte()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();

        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.screen_time, InputRange::new(0.0, 15.0, 5.0));
        assert_eq!(config.caffeine, InputRange::new(0.0, 800.0, 200.0));
        assert!(!config.clamp_inputs);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = DashboardConfig::from_json(
            r#"{ "data_path": "data/survey.csv", "clamp_inputs": true }"#,
        )
        .unwrap();

        assert_eq!(config.data_path, PathBuf::from("data/survey.csv"));
        assert!(config.clamp_inputs);
        assert_eq!(config.delimiter, ',');
        assert_eq!(config.caffeine.max, 800.0);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = DashboardConfig::with_data_path("lifestyle.tsv");
        let parsed = DashboardConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let result = DashboardConfig::from_json(
            r#"{ "screen_time": { "min": 10.0, "max": 2.0, "default": 5.0 } }"#,
        );
        assert!(matches!(result, Err(DashboardError::ConfigError(_))));
    }

    #[test]
    fn test_default_outside_range_rejected() {
        let result = DashboardConfig::from_json(
            r#"{ "caffeine": { "min": 0.0, "max": 100.0, "default": 200.0 } }"#,
        );
        assert!(matches!(result, Err(DashboardError::ConfigError(_))));
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let config = DashboardConfig {
            delimiter: '§',
            ..DashboardConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            DashboardConfig::from_json("not json"),
            Err(DashboardError::JsonError(_))
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let path = std::env::temp_dir().join(format!("missing-{}.json", uuid::Uuid::new_v4()));
        assert!(matches!(
            DashboardConfig::from_json_file(&path),
            Err(DashboardError::ConfigError(_))
        ));
    }

    #[test]
    fn test_clamp() {
        let range = InputRange::new(0.0, 15.0, 5.0);
        assert_eq!(range.clamp(20.0).unwrap(), 15.0);
        assert_eq!(range.clamp(-1.0).unwrap(), 0.0);
        assert_eq!(range.clamp(7.5).unwrap(), 7.5);
    }

    #[test]
    fn test_clamp_rejects_inverted_range() {
        let range = InputRange::new(10.0, 2.0, 5.0);
        assert!(matches!(
            range.clamp(20.0),
            Err(DashboardError::ConfigError(_))
        ));

        let unbounded = InputRange::new(0.0, f64::INFINITY, 5.0);
        assert!(matches!(
            unbounded.clamp(20.0),
            Err(DashboardError::ConfigError(_))
        ));
    }
}
