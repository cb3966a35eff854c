//! Lifestyle Stress - compute core for a lifestyle and mental wellness dashboard
//!
//! The crate turns a delimited export of self-reported lifestyle metrics into
//! dashboard figures through a load-once pipeline: dataset loading and
//! cleaning → summary aggregation → stress regression → report encoding.
//!
//! ## Modules
//!
//! - **Loader**: Read the source and drop rows with any missing value
//! - **Estimator**: Least-squares model of stress on screen time and caffeine
//! - **Summary / Feedback**: Aggregates and guidance shown beside the estimate

pub mod config;
pub mod encoder;
pub mod error;
pub mod estimator;
pub mod feedback;
pub mod loader;
pub mod pipeline;
pub mod summary;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::{DashboardConfig, InputRange};
pub use error::DashboardError;
pub use estimator::{EstimatorModel, StressEstimator};
pub use loader::{load, DatasetLoader};
pub use pipeline::{estimate_stress, Dashboard, Estimate};
pub use summary::DashboardSummary;
pub use types::{Dataset, Record};

/// Crate version embedded in all reports
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "lifestyle-stress";
