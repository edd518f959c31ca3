//! Multi-day forecast generation
//!
//! Every day is predicted from the same input, the most recent reading, so
//! the spread between days comes only from the injected Gaussian noise. The
//! temperature range around each prediction is skewed by time of day.

use chrono::{Days, NaiveDateTime, Timelike};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PredictorConfig;
use crate::models::{ForecastEntry, Reading};
use crate::regression::trainer::{FieldSpread, Prediction, TrainedModels};
use crate::{Result, SkycastError};

#[derive(Debug, Clone, Copy)]
pub struct ForecastSettings {
    /// Number of days to forecast, day 0 being today
    pub days: u32,
    /// Noise standard deviation as a fraction of each field's spread
    pub noise_factor: f64,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            days: 7,
            noise_factor: 0.2,
        }
    }
}

impl From<&PredictorConfig> for ForecastSettings {
    fn from(config: &PredictorConfig) -> Self {
        Self {
            days: config.forecast_days,
            noise_factor: config.noise_factor,
        }
    }
}

/// Daytime is 06:00 up to but excluding 18:00
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayPeriod {
    Day,
    Night,
}

impl DayPeriod {
    #[must_use]
    pub fn from_hour(hour: u32) -> Self {
        if (6..18).contains(&hour) {
            Self::Day
        } else {
            Self::Night
        }
    }

    /// `(min_scale, max_scale)` applied to the temperature spread
    #[must_use]
    pub fn scales(self) -> (f64, f64) {
        match self {
            Self::Day => (2.0, 0.5),
            Self::Night => (0.5, 2.0),
        }
    }
}

/// Produce `settings.days` entries starting at `now`.
///
/// `models` must have been trained immediately before, and `latest` is the
/// most recent stored reading.
pub fn generate<R: Rng + ?Sized>(
    models: &TrainedModels,
    latest: &Reading,
    now: NaiveDateTime,
    settings: &ForecastSettings,
    rng: &mut R,
) -> Result<Vec<ForecastEntry>> {
    let spread = models.spread();
    let noise = NoiseModel::new(&spread, settings.noise_factor)?;
    let features = latest.features();

    (0..settings.days)
        .map(|day| {
            let date_time = now
                .checked_add_days(Days::new(u64::from(day)))
                .ok_or_else(|| SkycastError::validation("forecast date out of range"))?;

            let base = models.predict(&features);
            let perturbed = noise.perturb(base, rng);
            let entry = build_entry(date_time, perturbed, spread.temperature);

            debug!(
                "Day {}: base temp {:.2}, perturbed {:.2}, range {:.2}..{:.2}",
                day, base.temperature, perturbed.temperature, entry.min_temperature, entry.max_temperature
            );
            Ok(entry)
        })
        .collect()
}

/// Assemble one day's entry from already-perturbed predictions.
#[must_use]
pub fn build_entry(
    date_time: NaiveDateTime,
    perturbed: Prediction,
    temperature_spread: f64,
) -> ForecastEntry {
    // The hour comes from the invocation time shifted by whole days, so the
    // period is the same for every day of one forecast.
    let (min_scale, max_scale) = DayPeriod::from_hour(date_time.hour()).scales();

    ForecastEntry {
        date: date_time.date(),
        min_temperature: round2(perturbed.temperature - temperature_spread * min_scale),
        max_temperature: round2(perturbed.temperature + temperature_spread * max_scale),
        humidity: round2(perturbed.humidity.clamp(0.0, 100.0)),
        pressure: round2(perturbed.pressure),
    }
}

/// Round to two decimal places
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Independent zero-mean Gaussian noise per field
struct NoiseModel {
    temperature: Option<Normal<f64>>,
    humidity: Option<Normal<f64>>,
    pressure: Option<Normal<f64>>,
}

impl NoiseModel {
    fn new(spread: &FieldSpread, factor: f64) -> Result<Self> {
        Ok(Self {
            temperature: normal(spread.temperature * factor)?,
            humidity: normal(spread.humidity * factor)?,
            pressure: normal(spread.pressure * factor)?,
        })
    }

    fn perturb<R: Rng + ?Sized>(&self, base: Prediction, rng: &mut R) -> Prediction {
        Prediction {
            temperature: base.temperature + draw(self.temperature.as_ref(), rng),
            humidity: base.humidity + draw(self.humidity.as_ref(), rng),
            pressure: base.pressure + draw(self.pressure.as_ref(), rng),
        }
    }
}

fn normal(std_dev: f64) -> Result<Option<Normal<f64>>> {
    if std_dev == 0.0 {
        return Ok(None);
    }
    Normal::new(0.0, std_dev)
        .map(Some)
        .map_err(|e| SkycastError::validation(format!("invalid noise spread {std_dev}: {e}")))
}

fn draw<R: Rng + ?Sized>(distribution: Option<&Normal<f64>>, rng: &mut R) -> f64 {
    distribution.map_or(0.0, |d| d.sample(rng))
}
