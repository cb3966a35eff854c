//! Core types for the lifestyle stress core
//!
//! This module defines the records that flow out of the loader and the
//! dataset that the summary and estimator stages consume.

use serde::{Deserialize, Serialize};

/// Column holding the self-reported gender
pub const GENDER_COLUMN: &str = "gender";

/// Column holding daily screen time in hours
pub const SCREEN_TIME_COLUMN: &str = "daily_screen_time_hours";

/// Column holding daily caffeine intake in milligrams
pub const CAFFEINE_COLUMN: &str = "caffeine_intake_mg_per_day";

/// Column holding the stress level on a 0-10 scale
pub const STRESS_COLUMN: &str = "stress_level";

/// Alternate header for the stress column found in published exports
pub const STRESS_COLUMN_ALIAS: &str = "stress_level/10";

/// Columns every source must provide
pub const REQUIRED_COLUMNS: [&str; 4] = [
    GENDER_COLUMN,
    SCREEN_TIME_COLUMN,
    CAFFEINE_COLUMN,
    STRESS_COLUMN,
];

/// One cleaned row of the lifestyle dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Self-reported gender (categorical)
    pub gender: String,
    /// Daily screen time (hours, >= 0)
    pub daily_screen_time_hours: f64,
    /// Daily caffeine intake (mg)
    pub caffeine_intake_mg_per_day: u32,
    /// Stress level (nominal 0-10)
    pub stress_level: f64,
}

impl Record {
    pub fn new(
        gender: impl Into<String>,
        daily_screen_time_hours: f64,
        caffeine_intake_mg_per_day: u32,
        stress_level: f64,
    ) -> Self {
        Self {
            gender: gender.into(),
            daily_screen_time_hours,
            caffeine_intake_mg_per_day,
            stress_level,
        }
    }

    /// Caffeine intake as a regression predictor
    pub fn caffeine_mg(&self) -> f64 {
        f64::from(self.caffeine_intake_mg_per_day)
    }
}

/// Cleaned, read-only dataset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Human-readable description of where the rows came from
    source: String,
    /// Records that survived cleaning, in source order
    records: Vec<Record>,
    /// Data rows read from the source (header excluded)
    rows_read: usize,
}

impl Dataset {
    /// Build a dataset from already-clean records
    pub fn from_records(source: impl Into<String>, records: Vec<Record>) -> Self {
        let rows_read = records.len();
        Self {
            source: source.into(),
            records,
            rows_read,
        }
    }

    pub(crate) fn with_rows_read(mut self, rows_read: usize) -> Self {
        self.rows_read = rows_read;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Rows removed because some column was missing
    pub fn rows_dropped(&self) -> usize {
        self.rows_read.saturating_sub(self.records.len())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
