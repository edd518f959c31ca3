//! Forecast model and console rendering

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::reading::DISPLAY_FORMAT;

/// One day's predicted values, already rounded to two decimals
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastEntry {
    pub date: NaiveDate,
    /// Low temperature in Celsius
    pub min_temperature: f64,
    /// High temperature in Celsius
    pub max_temperature: f64,
    /// Relative humidity in percent, within [0, 100]
    pub humidity: f64,
    /// Pressure in hPa
    pub pressure: f64,
}

/// A multi-day forecast, day 0 first
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Forecast {
    /// When this forecast was generated
    pub generated_at: NaiveDateTime,
    pub entries: Vec<ForecastEntry>,
}

impl Forecast {
    #[must_use]
    pub fn new(generated_at: NaiveDateTime, entries: Vec<ForecastEntry>) -> Self {
        Self {
            generated_at,
            entries,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Render the forecast as a fixed-width table for console output
    #[must_use]
    pub fn render_table(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Forecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);

        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{}-Day Weather Forecast (Generated at: {})",
            self.entries.len(),
            self.generated_at.format(DISPLAY_FORMAT)
        )?;
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{:<12} {:<10} {:<10} {:<10} {:<10}",
            "Date", "Min Temp", "Max Temp", "Humidity", "Pressure"
        )?;
        writeln!(f, "{}", "-".repeat(60))?;

        for day in &self.entries {
            writeln!(
                f,
                "{:<12} {:>6.1}°C   {:>6.1}°C   {:>6.1}%    {:>6.1} hPa",
                day.date.format("%Y-%m-%d").to_string(),
                day.min_temperature,
                day.max_temperature,
                day.humidity,
                day.pressure
            )?;
        }
        writeln!(f, "{rule}")
    }
}
