//! Weather reading model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp formats accepted when reading archived or API timestamps.
const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Format used when a reading's timestamp is shown or written back out
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One observation of the three tracked fields
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Source-local time of the observation
    pub timestamp: NaiveDateTime,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Mean sea level pressure in hPa
    pub pressure: f64,
}

impl Reading {
    #[must_use]
    pub fn new(timestamp: NaiveDateTime, temperature: f64, humidity: f64, pressure: f64) -> Self {
        Self {
            timestamp,
            temperature,
            humidity,
            pressure,
        }
    }

    /// Feature vector used by the regressors: `[temperature, humidity, pressure]`
    #[must_use]
    pub fn features(&self) -> [f64; 3] {
        [self.temperature, self.humidity, self.pressure]
    }

    /// True when all three measured values are finite numbers
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.features().iter().all(|v| v.is_finite())
    }

    /// Parse a timestamp as produced by Open-Meteo or by this crate's archive.
    #[must_use]
    pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    }

    #[must_use]
    pub fn format_timestamp(&self) -> String {
        self.timestamp.format(DISPLAY_FORMAT).to_string()
    }
}
