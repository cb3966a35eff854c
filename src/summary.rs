//! Descriptive summaries
//!
//! This module computes the aggregates a lifestyle dashboard displays next to
//! the estimator:
//! - Overall averages of screen time, caffeine intake, and stress
//! - Per-gender averages of screen time and caffeine intake
//! - Distribution of stress levels across Low / Moderate / High bands

use crate::types::Dataset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dataset-wide averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewMetrics {
    pub record_count: usize,
    /// Mean daily screen time (hours)
    pub avg_screen_time_hours: Option<f64>,
    /// Mean daily caffeine intake (mg)
    pub avg_caffeine_mg: Option<f64>,
    /// Mean stress level (/10)
    pub avg_stress_level: Option<f64>,
}

impl OverviewMetrics {
    pub fn compute(dataset: &Dataset) -> Self {
        Self {
            record_count: dataset.len(),
            avg_screen_time_hours: mean(dataset.iter().map(|r| r.daily_screen_time_hours)),
            avg_caffeine_mg: mean(dataset.iter().map(|r| r.caffeine_mg())),
            avg_stress_level: mean(dataset.iter().map(|r| r.stress_level)),
        }
    }
}

/// Averages for one gender group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderGroup {
    pub gender: String,
    pub record_count: usize,
    pub avg_screen_time_hours: f64,
    pub avg_caffeine_mg: f64,
}

/// Per-gender averages, ordered by gender name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenderAverages {
    pub groups: Vec<GenderGroup>,
}

impl GenderAverages {
    pub fn compute(dataset: &Dataset) -> Self {
        // (count, screen sum, caffeine sum)
        let mut totals: BTreeMap<&str, (usize, f64, f64)> = BTreeMap::new();

        for record in dataset {
            let entry = totals.entry(record.gender.as_str()).or_default();
            entry.0 += 1;
            entry.1 += record.daily_screen_time_hours;
            entry.2 += record.caffeine_mg();
        }

        let groups = totals
            .into_iter()
            .map(|(gender, (count, screen, caffeine))| GenderGroup {
                gender: gender.to_string(),
                record_count: count,
                avg_screen_time_hours: screen / count as f64,
                avg_caffeine_mg: caffeine / count as f64,
            })
            .collect();

        Self { groups }
    }

    /// Look up a group by gender label
    pub fn get(&self, gender: &str) -> Option<&GenderGroup> {
        self.groups.iter().find(|g| g.gender == gender)
    }
}

/// Stress level band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressBand {
    /// (0, 3]
    Low,
    /// (3, 6]
    Moderate,
    /// (6, 10]
    High,
}

impl StressBand {
    pub const ALL: [StressBand; 3] = [StressBand::Low, StressBand::Moderate, StressBand::High];

    /// Classify a stress level. Bins are closed on the right; values at or
    /// below 0 or above 10 fall in no band.
    pub fn classify(stress_level: f64) -> Option<Self> {
        match stress_level {
            s if s > 0.0 && s <= 3.0 => Some(StressBand::Low),
            s if s > 3.0 && s <= 6.0 => Some(StressBand::Moderate),
            s if s > 6.0 && s <= 10.0 => Some(StressBand::High),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StressBand::Low => "Low",
            StressBand::Moderate => "Moderate",
            StressBand::High => "High",
        }
    }
}

/// Count and share of records in one band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandCount {
    pub band: StressBand,
    pub count: usize,
    /// Share of binned records (0-100)
    pub percentage: f64,
}

/// Distribution of stress levels across bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressDistribution {
    pub bands: Vec<BandCount>,
    /// Records whose stress level fell outside every band
    pub unbinned: usize,
}

impl StressDistribution {
    pub fn compute(dataset: &Dataset) -> Self {
        let mut counts = [0usize; 3];
        let mut unbinned = 0;

        for record in dataset {
            match StressBand::classify(record.stress_level) {
                Some(band) => counts[band as usize] += 1,
                None => unbinned += 1,
            }
        }

        let binned: usize = counts.iter().sum();
        let bands = StressBand::ALL
            .iter()
            .zip(counts)
            .map(|(&band, count)| BandCount {
                band,
                count,
                percentage: if binned == 0 {
                    0.0
                } else {
                    count as f64 * 100.0 / binned as f64
                },
            })
            .collect();

        Self { bands, unbinned }
    }

    pub fn count(&self, band: StressBand) -> usize {
        self.bands
            .iter()
            .find(|b| b.band == band)
            .map(|b| b.count)
            .unwrap_or(0)
    }
}

/// All dashboard summaries together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub overview: OverviewMetrics,
    pub gender_averages: GenderAverages,
    pub stress_distribution: StressDistribution,
}

impl DashboardSummary {
    pub fn compute(dataset: &Dataset) -> Self {
        Self {
            overview: OverviewMetrics::compute(dataset),
            gender_averages: GenderAverages::compute(dataset),
            stress_distribution: StressDistribution::compute(dataset),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (count, sum) = values.fold((0usize, 0.0), |(count, sum), v| (count + 1, sum + v));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;
    use pretty_assertions::assert_eq;

    fn make_dataset() -> Dataset {
        Dataset::from_records(
            "test",
            vec![
                Record::new("Male", 6.0, 300, 7.0),
                Record::new("Female", 4.0, 100, 3.0),
                Record::new("Male", 8.0, 500, 9.0),
                Record::new("Female", 2.0, 200, 5.0),
                Record::new("Other", 5.0, 150, 0.0),
            ],
        )
    }

    #[test]
    fn test_overview_metrics() {
        let overview = OverviewMetrics::compute(&make_dataset());

        assert_eq!(overview.record_count, 5);
        assert!((overview.avg_screen_time_hours.unwrap() - 5.0).abs() < 1e-9);
        assert!((overview.avg_caffeine_mg.unwrap() - 250.0).abs() < 1e-9);
        assert!((overview.avg_stress_level.unwrap() - 4.8).abs() < 1e-9);
    }

    #[test]
    fn test_overview_empty_dataset() {
        let overview = OverviewMetrics::compute(&Dataset::default());
        assert_eq!(
            overview,
            OverviewMetrics {
                record_count: 0,
                avg_screen_time_hours: None,
                avg_caffeine_mg: None,
                avg_stress_level: None,
            }
        );
    }

    #[test]
    fn test_gender_averages_sorted_by_gender() {
        let averages = GenderAverages::compute(&make_dataset());

        assert_eq!(
            averages.groups,
            vec![
                GenderGroup {
                    gender: "Female".to_string(),
                    record_count: 2,
                    avg_screen_time_hours: 3.0,
                    avg_caffeine_mg: 150.0,
                },
                GenderGroup {
                    gender: "Male".to_string(),
                    record_count: 2,
                    avg_screen_time_hours: 7.0,
                    avg_caffeine_mg: 400.0,
                },
                GenderGroup {
                    gender: "Other".to_string(),
                    record_count: 1,
                    avg_screen_time_hours: 5.0,
                    avg_caffeine_mg: 150.0,
                },
            ]
        );
        assert!(averages.get("Nonexistent").is_none());
    }

    #[test]
    fn test_stress_band_edges() {
        assert_eq!(StressBand::classify(0.0), None);
        assert_eq!(StressBand::classify(0.1), Some(StressBand::Low));
        assert_eq!(StressBand::classify(3.0), Some(StressBand::Low));
        assert_eq!(StressBand::classify(3.01), Some(StressBand::Moderate));
        assert_eq!(StressBand::classify(6.0), Some(StressBand::Moderate));
        assert_eq!(StressBand::classify(10.0), Some(StressBand::High));
        assert_eq!(StressBand::classify(10.5), None);
    }

    #[test]
    fn test_stress_distribution() {
        let distribution = StressDistribution::compute(&make_dataset());

        assert_eq!(distribution.count(StressBand::Low), 1);
        assert_eq!(distribution.count(StressBand::Moderate), 1);
        assert_eq!(distribution.count(StressBand::High), 2);
        assert_eq!(distribution.unbinned, 1);

        let high = &distribution.bands[2];
        assert_eq!(high.band, StressBand::High);
        assert!((high.percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_distribution_of_empty_dataset() {
        let distribution = StressDistribution::compute(&Dataset::default());
        assert!(distribution.bands.iter().all(|b| b.count == 0 && b.percentage == 0.0));
    }
}
