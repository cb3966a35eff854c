//! End-to-end checks through the public API: CSV text in, estimates out.

use lifestyle_stress::{
    Dashboard, DashboardConfig, DashboardError, DatasetLoader, EstimatorModel, StressEstimator,
};
use pretty_assertions::assert_eq;

const HEADER: &str =
    "user_id,gender,daily_screen_time_hours,caffeine_intake_mg_per_day,stress_level,sleep_quality";

fn load(rows: &[&str]) -> Result<lifestyle_stress::Dataset, DashboardError> {
    let csv = std::iter::once(HEADER)
        .chain(rows.iter().copied())
        .collect::<Vec<_>>()
        .join("\n");
    DatasetLoader::new().load_from_reader(csv.as_bytes(), "inline")
}

#[test]
fn test_linear_scenario_predicts_midpoint() {
    let dataset = load(&[
        "1,Female,2,100,2,7",
        "2,Male,5,300,5,6",
        "3,Female,8,500,8,5",
    ])
    .unwrap();

    let estimator = StressEstimator::new();
    estimator.fit(&dataset).unwrap();

    let stress = estimator.predict(5.0, 300.0).unwrap();
    assert!((stress - 5.0).abs() < 1e-3, "got {stress}");
}

#[test]
fn test_row_with_missing_gender_is_not_fit() {
    let dataset = load(&[
        "1,Female,2,100,2,7",
        "2,,4,200,9,6",
        "3,Male,5,300,5,6",
        "4,Female,8,500,8,5",
    ])
    .unwrap();

    assert_eq!(dataset.len(), 3);
    assert_eq!(
        dataset
            .iter()
            .map(|r| r.gender.as_str())
            .collect::<Vec<_>>(),
        vec!["Female", "Male", "Female"]
    );

    // The dropped row (stress 9) would otherwise pull the fit away from the line
    let model = EstimatorModel::fit(&dataset).unwrap();
    assert!((model.predict(5.0, 300.0) - 5.0).abs() < 1e-3);
    assert!(model.residual_sum_of_squares(&dataset) < 1e-9);
}

#[test]
fn test_missing_stress_column_fails_before_fit() {
    let csv = "gender,daily_screen_time_hours,caffeine_intake_mg_per_day\nFemale,2,100\n";
    let result = DatasetLoader::new().load_from_reader(csv.as_bytes(), "inline");
    assert!(matches!(result, Err(DashboardError::SchemaError(_))));
}

#[test]
fn test_constant_inputs_cannot_be_fit() {
    let dataset = load(&[
        "1,Female,6,250,3,7",
        "2,Male,6,250,6,6",
        "3,Female,6,250,9,5",
    ])
    .unwrap();

    let estimator = StressEstimator::new();
    assert!(matches!(
        estimator.fit(&dataset),
        Err(DashboardError::DegenerateInput(_))
    ));
    assert!(matches!(
        estimator.predict(6.0, 250.0),
        Err(DashboardError::ModelNotFit)
    ));
}

#[test]
fn test_dashboard_serves_repeated_estimates() {
    let dataset = load(&[
        "1,Female,3.5,120,3.8,7",
        "2,Male,7.2,310,7.1,5",
        "3,Female,5.0,200,5.3,6",
        "4,Other,9.1,420,8.4,4",
        "5,Male,6.3,150,5.9,6",
    ])
    .unwrap();

    let dashboard = Dashboard::from_dataset(DashboardConfig::default(), dataset).unwrap();
    let model = dashboard.model().unwrap();

    for (screen, caffeine) in [(0.0, 0.0), (5.0, 200.0), (15.0, 800.0)] {
        let first = dashboard.estimate(screen, caffeine).unwrap();
        let second = dashboard.estimate(screen, caffeine).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.stress_level, model.predict(screen, caffeine));
    }
}
