//! Dataset loading and cleaning
//!
//! This module reads a delimited lifestyle export and turns it into a cleaned
//! [`Dataset`]:
//! - Required columns are resolved from the header before any row is read
//! - Rows with a missing value in any column are dropped entirely
//! - Required fields are parsed into typed [`Record`]s

use crate::error::DashboardError;
use crate::types::{
    Dataset, Record, CAFFEINE_COLUMN, GENDER_COLUMN, REQUIRED_COLUMNS, SCREEN_TIME_COLUMN,
    STRESS_COLUMN, STRESS_COLUMN_ALIAS,
};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Default field delimiter
pub const DEFAULT_DELIMITER: u8 = b',';

/// Cell values treated as missing, in addition to empty cells
pub const NULL_MARKERS: [&str; 18] = [
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>", "#N/A",
    "#N/A N/A", "#NA", "-1.#IND", "1.#IND", "-1.#QNAN", "1.#QNAN",
];

/// Loader for delimited lifestyle datasets
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    delimiter: u8,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetLoader {
    /// Create a loader for comma-separated sources
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Create a loader with a specific field delimiter
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Load and clean a dataset from a file on disk
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Dataset, DashboardError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            DashboardError::DataUnavailable(format!("cannot open {}: {}", path.display(), e))
        })?;

        self.load_from_reader(BufReader::new(file), &path.display().to_string())
    }

    /// Load and clean a dataset from any reader
    ///
    /// `source` is only used for provenance and log messages.
    pub fn load_from_reader<R: Read>(
        &self,
        reader: R,
        source: &str,
    ) -> Result<Dataset, DashboardError> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers().map_err(map_csv_error)?.clone();
        let columns = ColumnIndex::resolve(&headers)?;
        let width = headers.len();

        let mut records = Vec::new();
        let mut rows_read = 0usize;

        for (index, result) in csv_reader.records().enumerate() {
            let row = index + 1;
            let raw = result.map_err(map_csv_error)?;
            rows_read += 1;

            if raw.len() > width {
                return Err(DashboardError::MalformedRow {
                    row,
                    reason: format!("expected {} fields, found {}", width, raw.len()),
                });
            }

            if raw.len() < width || raw.iter().any(is_missing) {
                debug!("Dropping row {row} from {source}: missing value");
                continue;
            }

            records.push(columns.parse(&raw, row)?);
        }

        let dataset = Dataset::from_records(source, records).with_rows_read(rows_read);

        info!(
            "Loaded {} records from {} ({} read, {} dropped)",
            dataset.len(),
            source,
            dataset.rows_read(),
            dataset.rows_dropped()
        );
        if dataset.is_empty() {
            warn!("No complete rows remain in {source} after cleaning");
        }

        Ok(dataset)
    }
}

/// Load a dataset with the default loader
pub fn load(path: impl AsRef<Path>) -> Result<Dataset, DashboardError> {
    DatasetLoader::new().load(path)
}

/// Positions of the required columns within a header row
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    gender: usize,
    screen_time: usize,
    caffeine: usize,
    stress: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self, DashboardError> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let gender = find(GENDER_COLUMN);
        let screen_time = find(SCREEN_TIME_COLUMN);
        let caffeine = find(CAFFEINE_COLUMN);
        let stress = find(STRESS_COLUMN).or_else(|| find(STRESS_COLUMN_ALIAS));

        match (gender, screen_time, caffeine, stress) {
            (Some(gender), Some(screen_time), Some(caffeine), Some(stress)) => Ok(Self {
                gender,
                screen_time,
                caffeine,
                stress,
            }),
            _ => {
                let found = [gender, screen_time, caffeine, stress];
                let missing: Vec<&str> = REQUIRED_COLUMNS
                    .iter()
                    .zip(found)
                    .filter(|(_, position)| position.is_none())
                    .map(|(name, _)| *name)
                    .collect();
                Err(DashboardError::SchemaError(format!(
                    "missing required column(s): {}",
                    missing.join(", ")
                )))
            }
        }
    }

    fn parse(&self, raw: &StringRecord, row: usize) -> Result<Record, DashboardError> {
        let gender = raw[self.gender].to_string();
        let daily_screen_time_hours =
            parse_non_negative(&raw[self.screen_time], SCREEN_TIME_COLUMN, row)?;
        let caffeine_intake_mg_per_day = parse_milligrams(&raw[self.caffeine], row)?;
        let stress_level = parse_finite(&raw[self.stress], STRESS_COLUMN, row)?;

        Ok(Record {
            gender,
            daily_screen_time_hours,
            caffeine_intake_mg_per_day,
            stress_level,
        })
    }
}

fn is_missing(value: &str) -> bool {
    value.is_empty() || NULL_MARKERS.contains(&value)
}

fn invalid(value: &str, column: &str, row: usize) -> DashboardError {
    DashboardError::InvalidValue {
        row,
        column: column.to_string(),
        value: value.to_string(),
    }
}

fn parse_finite(value: &str, column: &str, row: usize) -> Result<f64, DashboardError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(value, column, row))
}

fn parse_non_negative(value: &str, column: &str, row: usize) -> Result<f64, DashboardError> {
    let parsed = parse_finite(value, column, row)?;
    if parsed < 0.0 {
        return Err(invalid(value, column, row));
    }
    Ok(parsed)
}

/// Caffeine is stored as whole milligrams; exports sometimes write "150.0"
fn parse_milligrams(value: &str, row: usize) -> Result<u32, DashboardError> {
    if let Ok(mg) = value.parse::<u32>() {
        return Ok(mg);
    }

    let parsed = parse_non_negative(value, CAFFEINE_COLUMN, row)?;
    if parsed.fract() != 0.0 || parsed > f64::from(u32::MAX) {
        return Err(invalid(value, CAFFEINE_COLUMN, row));
    }
    Ok(parsed as u32)
}

fn map_csv_error(err: csv::Error) -> DashboardError {
    let row = err
        .position()
        .map(|p| p.record() as usize)
        .unwrap_or_default();

    match err.kind() {
        csv::ErrorKind::Io(io_err) => DashboardError::DataUnavailable(io_err.to_string()),
        _ => DashboardError::MalformedRow {
            row,
            reason: err.to_string(),
        },
    }
}
