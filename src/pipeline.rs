//! Pipeline orchestration
//!
//! This module provides the public session API. A [`Dashboard`] loads and
//! fits once, then serves any number of estimates and reports from the cached
//! model.
//!
//! Stages:
//! 1. DatasetLoader - Read the source and drop incomplete rows
//! 2. StressEstimator - Fit the regression on every remaining record
//! 3. DashboardSummary - Aggregate overview, gender, and stress band figures
//! 4. ReportEncoder - Encode summaries, model, and estimates to JSON

use crate::config::DashboardConfig;
use crate::encoder::{DashboardReport, ReportEncoder};
use crate::error::DashboardError;
use crate::estimator::{EstimatorModel, StressEstimator};
use crate::feedback::LifestyleFeedback;
use crate::loader::DatasetLoader;
use crate::summary::DashboardSummary;
use crate::types::Dataset;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Result of one stress estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Screen time used for the prediction (after clamping, if enabled)
    pub screen_time_hours: f64,
    /// Caffeine used for the prediction (after clamping, if enabled)
    pub caffeine_mg: f64,
    /// Whether either input was moved into its configured range
    pub inputs_clamped: bool,
    /// Raw model output, not bounded to 0-10
    pub stress_level: f64,
    pub feedback: LifestyleFeedback,
}

/// Estimate stress from a dataset file in one call.
///
/// Loads and fits on every call; use [`Dashboard`] to serve repeated
/// estimates.
///
/// # Example
/// ```ignore
/// let stress = estimate_stress("digital_diet_mental_health.csv", 6.5, 250.0)?;
/// ```
pub fn estimate_stress(
    path: impl AsRef<Path>,
    screen_time_hours: f64,
    caffeine_mg: f64,
) -> Result<f64, DashboardError> {
    let dataset = DatasetLoader::new().load(path)?;
    let model = EstimatorModel::fit(&dataset)?;
    Ok(model.predict(screen_time_hours, caffeine_mg))
}

/// Loaded dataset plus fitted estimator
pub struct Dashboard {
    config: DashboardConfig,
    dataset: Dataset,
    estimator: StressEstimator,
    summary: DashboardSummary,
    encoder: ReportEncoder,
}

impl Dashboard {
    /// Load the configured dataset and fit the estimator
    pub fn open(config: DashboardConfig) -> Result<Self, DashboardError> {
        config.validate()?;
        let loader = DatasetLoader::with_delimiter(config.delimiter_byte()?);
        let dataset = loader.load(&config.data_path)?;
        Self::from_dataset(config, dataset)
    }

    /// Load a dataset from a path with default settings
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self, DashboardError> {
        Self::open(DashboardConfig::with_data_path(path.as_ref()))
    }

    /// Fit the estimator on an already loaded dataset
    pub fn from_dataset(config: DashboardConfig, dataset: Dataset) -> Result<Self, DashboardError> {
        config.validate()?;
        let estimator = StressEstimator::fitted(&dataset)?;
        let summary = DashboardSummary::compute(&dataset);

        info!("Dashboard ready with {} records", dataset.len());

        Ok(Self {
            config,
            dataset,
            estimator,
            summary,
            encoder: ReportEncoder::new(),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn summary(&self) -> &DashboardSummary {
        &self.summary
    }

    pub fn estimator(&self) -> &StressEstimator {
        &self.estimator
    }

    /// The fitted model
    pub fn model(&self) -> Result<Arc<EstimatorModel>, DashboardError> {
        self.estimator.model().ok_or(DashboardError::ModelNotFit)
    }

    /// Estimate stress for one pair of inputs
    pub fn estimate(
        &self,
        screen_time_hours: f64,
        caffeine_mg: f64,
    ) -> Result<Estimate, DashboardError> {
        let (screen, caffeine) = if self.config.clamp_inputs {
            (
                self.config.screen_time.clamp(screen_time_hours)?,
                self.config.caffeine.clamp(caffeine_mg)?,
            )
        } else {
            (screen_time_hours, caffeine_mg)
        };

        let stress_level = self.estimator.predict(screen, caffeine)?;
        // Bitwise so a NaN passed through unchanged is not reported as moved
        let inputs_clamped = screen.to_bits() != screen_time_hours.to_bits()
            || caffeine.to_bits() != caffeine_mg.to_bits();

        Ok(Estimate {
            screen_time_hours: screen,
            caffeine_mg: caffeine,
            inputs_clamped,
            stress_level,
            feedback: LifestyleFeedback::assess(screen, caffeine),
        })
    }

    /// Estimate using the configured default inputs
    pub fn default_estimate(&self) -> Result<Estimate, DashboardError> {
        self.estimate(self.config.screen_time.default, self.config.caffeine.default)
    }

    /// Reload the dataset from the configured source and refit.
    ///
    /// On failure the previous dataset and model stay in place.
    pub fn reload(&mut self) -> Result<(), DashboardError> {
        let loader = DatasetLoader::with_delimiter(self.config.delimiter_byte()?);
        let dataset = loader.load(&self.config.data_path)?;
        self.estimator.fit(&dataset)?;
        self.summary = DashboardSummary::compute(&dataset);
        self.dataset = dataset;
        Ok(())
    }

    /// Build a report, optionally including one estimate
    pub fn report(&self, estimate: Option<&Estimate>) -> Result<DashboardReport, DashboardError> {
        let model = self.model()?;
        Ok(self
            .encoder
            .encode(&self.dataset, &self.summary, &model, estimate))
    }

    /// Build a report and encode it as pretty JSON
    pub fn report_json(&self, estimate: Option<&Estimate>) -> Result<String, DashboardError> {
        let model = self.model()?;
        self.encoder
            .encode_to_json(&self.dataset, &self.summary, &model, estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{CaffeineFeedback, ScreenTimeFeedback};
    use crate::types::Record;
    use std::path::PathBuf;

    const SAMPLE_CSV: &str = "\
user_id,gender,daily_screen_time_hours,caffeine_intake_mg_per_day,stress_level
1,Female,3.5,120,3.8
2,Male,7.2,310,7.1
3,Female,5.0,200,5.3
4,Other,9.1,420,8.4
5,Male,2.4,80,
6,Male,6.3,150,5.9
";

    fn write_sample() -> PathBuf {
        let path = std::env::temp_dir().join(format!("dashboard-{}.csv", uuid::Uuid::new_v4()));
        std::fs::write(&path, SAMPLE_CSV).unwrap();
        path
    }

    #[test]
    fn test_open_and_estimate() {
        let path = write_sample();
        let dashboard = Dashboard::open_path(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(dashboard.dataset().len(), 5);
        assert_eq!(dashboard.dataset().rows_dropped(), 1);

        let estimate = dashboard.estimate(6.0, 250.0).unwrap();
        let model = dashboard.model().unwrap();
        assert_eq!(estimate.stress_level, model.predict(6.0, 250.0));
        assert!(!estimate.inputs_clamped);
        assert_eq!(estimate.feedback.screen_time, ScreenTimeFeedback::Moderate);
        assert_eq!(estimate.feedback.caffeine, CaffeineFeedback::Moderate);
    }

    #[test]
    fn test_estimate_stress_one_shot() {
        let path = write_sample();
        let one_shot = estimate_stress(&path, 6.0, 250.0).unwrap();
        let dashboard = Dashboard::open_path(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(one_shot, dashboard.estimate(6.0, 250.0).unwrap().stress_level);
    }

    #[test]
    fn test_missing_source() {
        let config = DashboardConfig::with_data_path("/nonexistent/lifestyle.csv");
        assert!(matches!(
            Dashboard::open(config),
            Err(DashboardError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_clamping_only_when_enabled() {
        let dataset = Dataset::from_records(
            "memory",
            vec![
                Record::new("Female", 1.0, 100, 2.0),
                Record::new("Male", 4.0, 50, 4.0),
                Record::new("Female", 8.0, 400, 8.0),
            ],
        );

        let free = Dashboard::from_dataset(DashboardConfig::default(), dataset.clone()).unwrap();
        let unclamped = free.estimate(20.0, 1000.0).unwrap();
        assert_eq!(unclamped.screen_time_hours, 20.0);
        assert!(!unclamped.inputs_clamped);

        let config = DashboardConfig {
            clamp_inputs: true,
            ..DashboardConfig::default()
        };
        let clamped = Dashboard::from_dataset(config, dataset)
            .unwrap()
            .estimate(20.0, 1000.0)
            .unwrap();
        assert_eq!(clamped.screen_time_hours, 15.0);
        assert_eq!(clamped.caffeine_mg, 800.0);
        assert!(clamped.inputs_clamped);
        assert_eq!(clamped.stress_level, free.model().unwrap().predict(15.0, 800.0));
    }

    #[test]
    fn test_inverted_range_rejected_for_loaded_dataset() {
        let dataset = Dataset::from_records(
            "memory",
            vec![
                Record::new("Female", 1.0, 100, 2.0),
                Record::new("Male", 4.0, 50, 4.0),
                Record::new("Female", 8.0, 400, 8.0),
            ],
        );
        let config = DashboardConfig {
            screen_time: crate::config::InputRange::new(10.0, 2.0, 5.0),
            clamp_inputs: true,
            ..DashboardConfig::default()
        };

        assert!(matches!(
            Dashboard::from_dataset(config, dataset),
            Err(DashboardError::ConfigError(_))
        ));
    }

    #[test]
    fn test_nan_input_is_not_reported_as_clamped() {
        let dataset = Dataset::from_records(
            "memory",
            vec![
                Record::new("Female", 1.0, 100, 2.0),
                Record::new("Male", 4.0, 50, 4.0),
                Record::new("Female", 8.0, 400, 8.0),
            ],
        );
        let config = DashboardConfig {
            clamp_inputs: true,
            ..DashboardConfig::default()
        };
        let dashboard = Dashboard::from_dataset(config, dataset).unwrap();

        let estimate = dashboard.estimate(f64::NAN, 200.0).unwrap();
        assert!(estimate.screen_time_hours.is_nan());
        assert_eq!(estimate.caffeine_mg, 200.0);
        assert!(!estimate.inputs_clamped);

        let moved = dashboard.estimate(f64::NAN, 1000.0).unwrap();
        assert!(moved.inputs_clamped);
    }

    #[test]
    fn test_degenerate_dataset_fails_to_open() {
        let dataset = Dataset::from_records(
            "memory",
            vec![
                Record::new("Female", 4.0, 200, 2.0),
                Record::new("Male", 4.0, 200, 4.0),
                Record::new("Female", 4.0, 200, 8.0),
            ],
        );
        assert!(matches!(
            Dashboard::from_dataset(DashboardConfig::default(), dataset),
            Err(DashboardError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_reload_keeps_previous_state_on_failure() {
        let path = write_sample();
        let mut dashboard = Dashboard::open_path(&path).unwrap();
        let before = dashboard.model().unwrap();

        std::fs::remove_file(&path).unwrap();
        assert!(dashboard.reload().is_err());
        assert!(Arc::ptr_eq(&before, &dashboard.model().unwrap()));
        assert_eq!(dashboard.dataset().len(), 5);
    }

    #[test]
    fn test_reload_refits() {
        let path = write_sample();
        let mut dashboard = Dashboard::open_path(&path).unwrap();
        let before = dashboard.model().unwrap();

        std::fs::write(
            &path,
            "gender,daily_screen_time_hours,caffeine_intake_mg_per_day,stress_level\n\
             Female,1.0,100,9.0\nMale,2.0,50,7.0\nFemale,3.0,200,5.0\n",
        )
        .unwrap();
        dashboard.reload().unwrap();
        std::fs::remove_file(&path).ok();

        let after = dashboard.model().unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(dashboard.dataset().len(), 3);
        assert_eq!(dashboard.summary().overview.record_count, 3);
    }

    #[test]
    fn test_report_json() {
        let path = write_sample();
        let dashboard = Dashboard::open_path(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let estimate = dashboard.default_estimate().unwrap();
        let json = dashboard.report_json(Some(&estimate)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["provenance"]["records_dropped"], 1);
        assert_eq!(value["estimate"]["screen_time_hours"], 5.0);
        assert_eq!(value["estimate"]["caffeine_mg"], 200.0);
    }
}
