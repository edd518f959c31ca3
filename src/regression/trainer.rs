//! Fits the three per-field models from a window of readings

use tracing::{info, instrument};

use super::Features;
use super::forest::{ForestParams, RandomForest};
use crate::config::PredictorConfig;
use crate::models::Reading;
use crate::{Result, SkycastError};

/// Training thresholds and forest hyperparameters
#[derive(Debug, Clone, Copy)]
pub struct TrainerSettings {
    /// Fewer readings than this fails training (240 = 10 days hourly)
    pub min_readings: usize,
    /// Only the most recent this-many readings are used (720 = 30 days hourly)
    pub max_readings: usize,
    pub forest: ForestParams,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            min_readings: 240,
            max_readings: 720,
            forest: ForestParams::default(),
        }
    }
}

impl From<&PredictorConfig> for TrainerSettings {
    fn from(config: &PredictorConfig) -> Self {
        Self {
            min_readings: config.min_training_readings,
            max_readings: config.max_readings,
            forest: ForestParams {
                n_estimators: config.n_estimators,
                seed: config.seed,
                ..ForestParams::default()
            },
        }
    }
}

/// Standard deviation of each field over the training window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpread {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
}

impl FieldSpread {
    #[must_use]
    pub fn from_readings(readings: &[Reading]) -> Self {
        Self {
            temperature: std_dev(readings.iter().map(|r| r.temperature)),
            humidity: std_dev(readings.iter().map(|r| r.humidity)),
            pressure: std_dev(readings.iter().map(|r| r.pressure)),
        }
    }
}

/// Base predictions for the three fields
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
}

/// The three fitted models plus the statistics of the window they saw
#[derive(Debug, Clone)]
pub struct TrainedModels {
    temperature: RandomForest,
    humidity: RandomForest,
    pressure: RandomForest,
    spread: FieldSpread,
    samples: usize,
}

impl TrainedModels {
    #[must_use]
    pub fn predict(&self, features: &Features) -> Prediction {
        Prediction {
            temperature: self.temperature.predict(features),
            humidity: self.humidity.predict(features),
            pressure: self.pressure.predict(features),
        }
    }

    #[must_use]
    pub fn spread(&self) -> FieldSpread {
        self.spread
    }

    /// Number of readings in the training window
    #[must_use]
    pub fn samples(&self) -> usize {
        self.samples
    }
}

/// Train fresh models on the most recent `max_readings` of `readings`.
///
/// Fails with `InsufficientData` when fewer than `min_readings` are given.
#[instrument(level = "debug", skip(readings), fields(readings = readings.len()))]
pub fn train(readings: &[Reading], settings: &TrainerSettings) -> Result<TrainedModels> {
    if readings.len() < settings.min_readings {
        return Err(SkycastError::insufficient_data(
            settings.min_readings,
            readings.len(),
        ));
    }

    let skip = readings.len().saturating_sub(settings.max_readings);
    let window = &readings[skip..];

    let x: Vec<Features> = window.iter().map(Reading::features).collect();
    let y_temperature: Vec<f64> = window.iter().map(|r| r.temperature).collect();
    let y_humidity: Vec<f64> = window.iter().map(|r| r.humidity).collect();
    let y_pressure: Vec<f64> = window.iter().map(|r| r.pressure).collect();

    let models = TrainedModels {
        temperature: RandomForest::fit(&x, &y_temperature, &settings.forest)?,
        humidity: RandomForest::fit(&x, &y_humidity, &settings.forest)?,
        pressure: RandomForest::fit(&x, &y_pressure, &settings.forest)?,
        spread: FieldSpread::from_readings(window),
        samples: window.len(),
    };

    info!(
        "Trained models on {} readings (σ temp {:.2}, humidity {:.2}, pressure {:.2})",
        models.samples,
        models.spread.temperature,
        models.spread.humidity,
        models.spread.pressure
    );

    Ok(models)
}

/// Population standard deviation (divisor `n`); zero for an empty series.
#[must_use]
pub fn std_dev(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let (count, sum) = values.clone().fold((0usize, 0.0), |(n, s), v| (n + 1, s + v));
    if count == 0 {
        return 0.0;
    }
    let mean = sum / count as f64;
    let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
    variance.sqrt()
}
