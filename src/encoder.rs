//! Report encoding
//!
//! This module encodes dataset summaries, the fitted model, and an optional
//! estimate into a JSON report. Every report carries producer metadata and
//! provenance so downstream consumers can tell which dataset it describes.

use crate::error::DashboardError;
use crate::estimator::EstimatorModel;
use crate::feedback::FeedbackItem;
use crate::pipeline::Estimate;
use crate::summary::{DashboardSummary, GenderAverages, OverviewMetrics, StressDistribution};
use crate::types::Dataset;
use crate::{PRODUCER_NAME, VERSION};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current report format version
pub const REPORT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProvenance {
    /// Where the dataset was loaded from
    pub source: String,
    pub records_read: usize,
    pub records_loaded: usize,
    pub records_dropped: usize,
    pub computed_at_utc: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCoefficients {
    pub daily_screen_time_hours: f64,
    pub caffeine_intake_mg_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub kind: String,
    pub intercept: f64,
    pub coefficients: ModelCoefficients,
    pub n_samples: usize,
    /// In-sample coefficient of determination
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_squared: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEstimate {
    pub screen_time_hours: f64,
    pub caffeine_mg: f64,
    pub inputs_clamped: bool,
    /// Raw model output; may fall outside 0-10
    pub estimated_stress_level: f64,
    pub feedback: Vec<FeedbackItem>,
}

/// Full dashboard report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub overview: OverviewMetrics,
    pub gender_averages: GenderAverages,
    pub stress_distribution: StressDistribution,
    pub model: ModelSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<ReportEstimate>,
}

/// Encoder for dashboard reports
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Build a report from a dataset, its summary, and the fitted model
    pub fn encode(
        &self,
        dataset: &Dataset,
        summary: &DashboardSummary,
        model: &EstimatorModel,
        estimate: Option<&Estimate>,
    ) -> DashboardReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = ReportProvenance {
            source: dataset.source().to_string(),
            records_read: dataset.rows_read(),
            records_loaded: dataset.len(),
            records_dropped: dataset.rows_dropped(),
            computed_at_utc: Utc::now().to_rfc3339(),
        };

        DashboardReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            provenance,
            overview: summary.overview.clone(),
            gender_averages: summary.gender_averages.clone(),
            stress_distribution: summary.stress_distribution.clone(),
            model: self.build_model_summary(dataset, model),
            estimate: estimate.map(|e| self.build_estimate(e)),
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(
        &self,
        dataset: &Dataset,
        summary: &DashboardSummary,
        model: &EstimatorModel,
        estimate: Option<&Estimate>,
    ) -> Result<String, DashboardError> {
        let report = self.encode(dataset, summary, model, estimate);
        serde_json::to_string_pretty(&report).map_err(DashboardError::JsonError)
    }

    fn build_model_summary(&self, dataset: &Dataset, model: &EstimatorModel) -> ModelSummary {
        ModelSummary {
            kind: "ordinary_least_squares".to_string(),
            intercept: model.intercept,
            coefficients: ModelCoefficients {
                daily_screen_time_hours: model.screen_time_coef,
                caffeine_intake_mg_per_day: model.caffeine_coef,
            },
            n_samples: model.n_samples,
            r_squared: model.r_squared(dataset),
        }
    }

    fn build_estimate(&self, estimate: &Estimate) -> ReportEstimate {
        ReportEstimate {
            screen_time_hours: estimate.screen_time_hours,
            caffeine_mg: estimate.caffeine_mg,
            inputs_clamped: estimate.inputs_clamped,
            estimated_stress_level: estimate.stress_level,
            feedback: estimate.feedback.items(),
        }
    }
}
