//! Historical archive: filtering downloaded hourly data and persisting it as CSV
//!
//! Downloaded rows are written to a CSV file so that the observation store
//! can be (re)filled from disk. Reading tolerates damaged rows by skipping
//! them and counting them.

use chrono::{Days, NaiveDate};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

use crate::models::Reading;
use crate::weather::HourlySeries;
use crate::{Result, SkycastError};

const COLUMNS: [&str; 4] = ["timestamp", "temperature", "humidity", "pressure"];
const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Outcome of filtering an archive download
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSummary {
    /// Hourly rows in the response
    pub received: usize,
    /// Rows with all values present and finite
    pub valid: usize,
    /// Rows dropped for a missing or non-finite value
    pub invalid: usize,
}

/// Outcome of loading the CSV archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub total: usize,
    pub skipped: usize,
    pub accepted: usize,
}

/// Date range of the archive window: `days` days ending yesterday.
#[must_use]
pub fn archive_window(today: NaiveDate, days: u32) -> (NaiveDate, NaiveDate) {
    let end = today - Days::new(1);
    let start = end - Days::new(u64::from(days.saturating_sub(1)));
    (start, end)
}

/// Keep only the hourly rows whose timestamp parses and whose three values are present and finite.
#[must_use]
pub fn filter_hourly(series: &HourlySeries) -> (Vec<Reading>, DownloadSummary) {
    let value = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let readings: Vec<Reading> = series
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, time)| {
            let reading = Reading::new(
                Reading::parse_timestamp(time)?,
                value(&series.temperature, i)?,
                value(&series.humidity, i)?,
                value(&series.pressure, i)?,
            );
            reading.is_finite().then_some(reading)
        })
        .collect();

    let summary = DownloadSummary {
        received: series.len(),
        valid: readings.len(),
        invalid: series.len() - readings.len(),
    };
    (readings, summary)
}

#[derive(Debug, Serialize)]
struct ArchiveRow {
    timestamp: String,
    temperature: f64,
    humidity: f64,
    pressure: f64,
}

impl From<&Reading> for ArchiveRow {
    fn from(reading: &Reading) -> Self {
        Self {
            timestamp: reading.timestamp.format(ARCHIVE_TIMESTAMP_FORMAT).to_string(),
            temperature: reading.temperature,
            humidity: reading.humidity,
            pressure: reading.pressure,
        }
    }
}

/// CSV file holding the most recently downloaded history
#[derive(Debug, Clone)]
pub struct HistoryArchive {
    path: PathBuf,
}

impl HistoryArchive {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Overwrite the archive with `readings`, creating the parent directory if needed.
    #[instrument(level = "debug", skip(self, readings), fields(path = %self.path.display(), rows = readings.len()))]
    pub fn write(&self, readings: &[Reading]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SkycastError::persistence(format!(
                    "Failed to create archive directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;
        writer.write_record(COLUMNS)?;
        for reading in readings {
            writer.serialize(ArchiveRow::from(reading))?;
        }
        writer.flush()?;

        info!(
            "Saved {} readings to {}",
            readings.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Read every valid row back, skipping rows with blank or unparsable fields.
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<(Vec<Reading>, LoadSummary)> {
        if !self.path.exists() {
            return Err(SkycastError::persistence(format!(
                "No historical data CSV file found at {}",
                self.path.display()
            )));
        }

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_path(&self.path)?;
        let columns = column_positions(reader.headers()?)?;

        let mut readings = Vec::new();
        let mut summary = LoadSummary::default();

        for (row_number, record) in reader.records().enumerate() {
            summary.total += 1;
            // header is line 1
            let line = row_number + 2;

            let parsed = record
                .map_err(|e| SkycastError::validation(e.to_string()))
                .and_then(|record| parse_row(&record, &columns));

            match parsed {
                Ok(reading) => readings.push(reading),
                Err(e) => {
                    summary.skipped += 1;
                    debug!("Skipping line {}: {}", line, e);
                }
            }
        }
        summary.accepted = readings.len();

        if summary.skipped > 0 {
            warn!(
                "Skipped {} of {} archive rows in {}",
                summary.skipped,
                summary.total,
                self.path.display()
            );
        }
        Ok((readings, summary))
    }
}

fn column_positions(headers: &StringRecord) -> Result<[usize; 4]> {
    let mut positions = [0; 4];
    for (slot, name) in positions.iter_mut().zip(COLUMNS) {
        *slot = headers.iter().position(|h| h == name).ok_or_else(|| {
            SkycastError::persistence(format!("Archive is missing the '{name}' column"))
        })?;
    }
    Ok(positions)
}

fn parse_row(record: &StringRecord, columns: &[usize; 4]) -> Result<Reading> {
    let raw_timestamp = cell(record, columns[0], COLUMNS[0])?;
    let timestamp = Reading::parse_timestamp(raw_timestamp).ok_or_else(|| {
        SkycastError::validation(format!("unrecognised timestamp: {raw_timestamp}"))
    })?;

    Ok(Reading::new(
        timestamp,
        number(record, columns[1], COLUMNS[1])?,
        number(record, columns[2], COLUMNS[2])?,
        number(record, columns[3], COLUMNS[3])?,
    ))
}

fn cell<'a>(record: &'a StringRecord, position: usize, name: &str) -> Result<&'a str> {
    record
        .get(position)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| SkycastError::validation(format!("blank '{name}' field")))
}

fn number(record: &StringRecord, position: usize, name: &str) -> Result<f64> {
    let raw = cell(record, position, name)?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SkycastError::validation(format!("'{name}' is not a number: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    fn hourly(n: usize) -> HourlySeries {
        let start = NaiveDate::from_ymd_opt(2024, 4, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        HourlySeries {
            time: (0..n)
                .map(|i| (start + Duration::hours(i as i64)).format("%Y-%m-%dT%H:%M").to_string())
                .collect(),
            temperature: (0..n).map(|i| Some(25.0 + i as f64 * 0.1)).collect(),
            humidity: (0..n).map(|i| Some(60.0 + i as f64)).collect(),
            pressure: (0..n).map(|i| Some(1005.0 - i as f64 * 0.2)).collect(),
        }
    }

    #[test]
    fn test_archive_window_ends_yesterday() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let (start, end) = archive_window(today, 30);
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 3, 30).unwrap());
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_filter_drops_nan_pressure() {
        let mut series = hourly(10);
        series.pressure[4] = Some(f64::NAN);

        let (readings, summary) = filter_hourly(&series);
        assert_eq!(readings.len(), 9);
        assert_eq!(
            summary,
            DownloadSummary {
                received: 10,
                valid: 9,
                invalid: 1
            }
        );
    }

    #[test]
    fn test_filter_drops_missing_and_short_arrays() {
        let mut series = hourly(6);
        series.temperature[0] = None;
        series.humidity.truncate(5);

        let (readings, summary) = filter_hourly(&series);
        assert_eq!(readings.len(), 4);
        assert_eq!(summary.invalid, 2);
        assert!((readings[0].temperature - 25.1).abs() < 1e-9);
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = tempdir().unwrap();
        let archive = HistoryArchive::new(dir.path().join("data").join("history.csv"));
        let (readings, _) = filter_hourly(&hourly(48));

        archive.write(&readings).unwrap();
        let (loaded, summary) = archive.read().unwrap();

        assert_eq!(
            summary,
            LoadSummary {
                total: 48,
                skipped: 0,
                accepted: 48
            }
        );
        for (written, restored) in readings.iter().zip(&loaded) {
            assert_eq!(written.timestamp, restored.timestamp);
            assert!((written.temperature - restored.temperature).abs() < 1e-9);
            assert!((written.humidity - restored.humidity).abs() < 1e-9);
            assert!((written.pressure - restored.pressure).abs() < 1e-9);
        }
    }

    #[test]
    fn test_write_overwrites_previous_content() {
        let dir = tempdir().unwrap();
        let archive = HistoryArchive::new(dir.path().join("history.csv"));
        let (readings, _) = filter_hourly(&hourly(10));

        archive.write(&readings).unwrap();
        archive.write(&readings[..3]).unwrap();
        let (loaded, _) = archive.read().unwrap();
        assert_eq!(loaded.len(), 3);
    }

    #[test]
    fn test_read_skips_blank_and_garbled_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");
        std::fs::write(
            &path,
            "timestamp,temperature,humidity,pressure\n\
             2024-04-01T00:00,25.0,60,1005.1\n\
             2024-04-01T01:00,,61,1005.0\n\
             2024-04-01T02:00,24.8,sixty,1004.9\n\
             2024-04-01T03:00,24.7,62\n\
             not-a-date,24.6,63,1004.7\n\
             2024-04-01T05:00 , 24.5 , 64 , 1004.6\n",
        )
        .unwrap();

        let (loaded, summary) = HistoryArchive::new(&path).read().unwrap();
        assert_eq!(
            summary,
            LoadSummary {
                total: 6,
                skipped: 4,
                accepted: 2
            }
        );
        assert_eq!(loaded[1].humidity, 64.0);
    }

    #[test]
    fn test_read_missing_file_is_persistence_error() {
        let dir = tempdir().unwrap();
        let result = HistoryArchive::new(dir.path().join("absent.csv")).read();
        assert!(matches!(result, Err(SkycastError::Persistence { .. })));
    }

    #[test]
    fn test_read_missing_column_is_persistence_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");
        std::fs::write(&path, "timestamp,temperature,humidity\n2024-04-01T00:00,25,60\n").unwrap();

        let result = HistoryArchive::new(&path).read();
        assert!(matches!(result, Err(SkycastError::Persistence { .. })));
    }
}
