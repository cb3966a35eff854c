//! Stress estimation
//!
//! This module fits an ordinary least-squares model of stress level on daily
//! screen time and caffeine intake, and serves point predictions from it.
//!
//! The fit uses every record of the dataset. There is no train/test split and
//! no regularization, so diagnostics such as [`EstimatorModel::r_squared`]
//! are in-sample figures.

use crate::error::DashboardError;
use crate::types::Dataset;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Minimum number of records needed to fit an intercept and two slopes
pub const MIN_FIT_RECORDS: usize = 3;

/// Relative tolerance below which a direction of the predictor space is
/// treated as having no variance
const RANK_TOLERANCE: f64 = 1e-10;

/// Fitted linear model: `stress = intercept + c1 * screen + c2 * caffeine`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatorModel {
    /// Intercept term
    pub intercept: f64,
    /// Coefficient on daily screen time (per hour)
    pub screen_time_coef: f64,
    /// Coefficient on caffeine intake (per mg)
    pub caffeine_coef: f64,
    /// Number of records the model was fit on
    pub n_samples: usize,
}

impl EstimatorModel {
    /// Fit the model on the full dataset.
    ///
    /// Predictors are centered and the 2x2 cross-product system is solved in
    /// its eigenbasis, in the predictors' own units. Directions with no
    /// variance are dropped, which yields the minimum-norm least-squares
    /// solution when the predictors are collinear.
    ///
    /// # Errors
    /// `DegenerateInput` when fewer than [`MIN_FIT_RECORDS`] records are
    /// available or both predictors are constant.
    pub fn fit(dataset: &Dataset) -> Result<Self, DashboardError> {
        let n = dataset.len();
        if n < MIN_FIT_RECORDS {
            return Err(DashboardError::DegenerateInput(format!(
                "at least {MIN_FIT_RECORDS} records are required to fit, got {n}"
            )));
        }

        let moments = Moments::compute(dataset);
        let screen_varies = has_variance(moments.s11, moments.mean_screen, n);
        let caffeine_varies = has_variance(moments.s22, moments.mean_caffeine, n);

        let (screen_time_coef, caffeine_coef) = match (screen_varies, caffeine_varies) {
            (false, false) => {
                return Err(DashboardError::DegenerateInput(
                    "screen time and caffeine intake are both constant".to_string(),
                ));
            }
            (true, false) => {
                warn!("Caffeine intake is constant; fitting on screen time only");
                (moments.s1y / moments.s11, 0.0)
            }
            (false, true) => {
                warn!("Screen time is constant; fitting on caffeine intake only");
                (0.0, moments.s2y / moments.s22)
            }
            (true, true) => solve_min_norm(&moments),
        };

        let intercept = moments.mean_stress
            - screen_time_coef * moments.mean_screen
            - caffeine_coef * moments.mean_caffeine;

        let model = Self {
            intercept,
            screen_time_coef,
            caffeine_coef,
            n_samples: n,
        };

        debug!(
            "Fitted coefficients: intercept={:.6}, screen_time={:.6}, caffeine={:.6}",
            model.intercept, model.screen_time_coef, model.caffeine_coef
        );

        Ok(model)
    }

    /// Predict a stress level.
    ///
    /// Inputs are not bounded and the output is not clamped to 0-10; values
    /// far from the training ranges extrapolate linearly.
    pub fn predict(&self, screen_time: f64, caffeine_mg: f64) -> f64 {
        self.intercept + self.screen_time_coef * screen_time + self.caffeine_coef * caffeine_mg
    }

    /// Predictions for every record of a dataset, in order
    pub fn fitted_values(&self, dataset: &Dataset) -> Vec<f64> {
        dataset
            .iter()
            .map(|r| self.predict(r.daily_screen_time_hours, r.caffeine_mg()))
            .collect()
    }

    /// Sum of squared residuals over a dataset
    pub fn residual_sum_of_squares(&self, dataset: &Dataset) -> f64 {
        dataset
            .iter()
            .map(|r| {
                let fitted = self.predict(r.daily_screen_time_hours, r.caffeine_mg());
                (r.stress_level - fitted).powi(2)
            })
            .sum()
    }

    /// Coefficient of determination over a dataset.
    ///
    /// Returns `None` for an empty dataset or when the stress level is
    /// constant.
    pub fn r_squared(&self, dataset: &Dataset) -> Option<f64> {
        if dataset.is_empty() {
            return None;
        }

        let mean = dataset.iter().map(|r| r.stress_level).sum::<f64>() / dataset.len() as f64;
        let total: f64 = dataset
            .iter()
            .map(|r| (r.stress_level - mean).powi(2))
            .sum();

        if total <= 0.0 {
            return None;
        }

        Some(1.0 - self.residual_sum_of_squares(dataset) / total)
    }
}

/// Owner of the fitted model.
///
/// Starts unfit; [`StressEstimator::fit`] installs a model and a later fit
/// replaces it. The model is swapped in as a whole, so a reader never
/// observes a partially updated set of coefficients.
#[derive(Debug, Default)]
pub struct StressEstimator {
    model: RwLock<Option<Arc<EstimatorModel>>>,
}

impl StressEstimator {
    /// Create an unfit estimator
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an estimator that is already fit on a dataset
    pub fn fitted(dataset: &Dataset) -> Result<Self, DashboardError> {
        let estimator = Self::new();
        estimator.fit(dataset)?;
        Ok(estimator)
    }

    /// Fit on the full dataset and install the resulting model
    pub fn fit(&self, dataset: &Dataset) -> Result<Arc<EstimatorModel>, DashboardError> {
        let model = Arc::new(EstimatorModel::fit(dataset)?);

        let mut slot = self.model.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::clone(&model));

        info!(
            "Stress estimator fit on {} records from {}",
            model.n_samples,
            dataset.source()
        );
        Ok(model)
    }

    /// Current model, if any
    pub fn model(&self) -> Option<Arc<EstimatorModel>> {
        self.model
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(Arc::clone)
    }

    pub fn is_fit(&self) -> bool {
        self.model().is_some()
    }

    /// Predict with the current model
    ///
    /// # Errors
    /// `ModelNotFit` if [`StressEstimator::fit`] has not succeeded yet.
    pub fn predict(&self, screen_time: f64, caffeine_mg: f64) -> Result<f64, DashboardError> {
        self.model()
            .map(|model| model.predict(screen_time, caffeine_mg))
            .ok_or(DashboardError::ModelNotFit)
    }
}

/// Centered sums of squares and cross-products
struct Moments {
    mean_screen: f64,
    mean_caffeine: f64,
    mean_stress: f64,
    s11: f64,
    s22: f64,
    s12: f64,
    s1y: f64,
    s2y: f64,
}

impl Moments {
    fn compute(dataset: &Dataset) -> Self {
        let n = dataset.len() as f64;
        let mut mean_screen = 0.0;
        let mut mean_caffeine = 0.0;
        let mut mean_stress = 0.0;
        for r in dataset {
            mean_screen += r.daily_screen_time_hours;
            mean_caffeine += r.caffeine_mg();
            mean_stress += r.stress_level;
        }
        mean_screen /= n;
        mean_caffeine /= n;
        mean_stress /= n;

        let mut moments = Self {
            mean_screen,
            mean_caffeine,
            mean_stress,
            s11: 0.0,
            s22: 0.0,
            s12: 0.0,
            s1y: 0.0,
            s2y: 0.0,
        };

        for r in dataset {
            let d1 = r.daily_screen_time_hours - mean_screen;
            let d2 = r.caffeine_mg() - mean_caffeine;
            let dy = r.stress_level - mean_stress;
            moments.s11 += d1 * d1;
            moments.s22 += d2 * d2;
            moments.s12 += d1 * d2;
            moments.s1y += d1 * dy;
            moments.s2y += d2 * dy;
        }

        moments
    }
}

/// Whether a centered sum of squares reflects real spread rather than
/// rounding noise around the mean
fn has_variance(sum_sq: f64, mean: f64, n: usize) -> bool {
    let variance = sum_sq / n as f64;
    variance > RANK_TOLERANCE * (1.0 + mean * mean)
}

/// Solve `[[s11, s12], [s12, s22]] * b = [s1y, s2y]` with a pseudo-inverse.
///
/// The symmetric matrix is diagonalized by a rotation of angle
/// `0.5 * atan2(2 * s12, s11 - s22)`; eigenvalues at or below
/// `RANK_TOLERANCE` times the largest one are treated as zero.
fn solve_min_norm(m: &Moments) -> (f64, f64) {
    let theta = 0.5 * (2.0 * m.s12).atan2(m.s11 - m.s22);
    let (sin, cos) = theta.sin_cos();

    let eigenpairs = [
        (
            m.s11 * cos * cos + 2.0 * m.s12 * sin * cos + m.s22 * sin * sin,
            (cos, sin),
        ),
        (
            m.s11 * sin * sin - 2.0 * m.s12 * sin * cos + m.s22 * cos * cos,
            (-sin, cos),
        ),
    ];
    let largest = eigenpairs[0].0.max(eigenpairs[1].0);
    let cutoff = RANK_TOLERANCE * largest;

    let mut b1 = 0.0;
    let mut b2 = 0.0;
    let mut dropped = false;

    for (lambda, (v1, v2)) in eigenpairs {
        if lambda <= cutoff {
            dropped = true;
            continue;
        }
        let weight = (v1 * m.s1y + v2 * m.s2y) / lambda;
        b1 += weight * v1;
        b2 += weight * v2;
    }

    if dropped {
        warn!("Screen time and caffeine intake are collinear; using minimum-norm solution");
    }

    (b1, b2)
}
