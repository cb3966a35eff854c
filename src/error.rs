//! Error types for the lifestyle stress core

use thiserror::Error;

/// Errors that can occur while loading data, fitting, or estimating
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Dataset unavailable: {0}")]
    DataUnavailable(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Malformed row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("Invalid value {value:?} in column '{column}' at row {row}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Model not fit: the estimator must be fit before predicting")]
    ModelNotFit,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
