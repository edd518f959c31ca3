//! The weather predictor: rolling history plus train-and-forecast on demand
//!
//! A `WeatherPredictor` exclusively owns its observation store. Callers that
//! share one instance across tasks wrap it in [`SharedPredictor`], which
//! serializes fetch, load and forecast operations.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use crate::classifier::classify;
use crate::clock::Clock;
use crate::config::{PredictorConfig, SkycastConfig};
use crate::forecaster::{self, ForecastSettings};
use crate::history::{self, DownloadSummary, HistoryArchive, LoadSummary};
use crate::models::{Forecast, Location, Reading};
use crate::regression::{TrainedModels, TrainerSettings, train};
use crate::store::ObservationStore;
use crate::weather::{RateLimiter, WeatherSource};
use crate::{Result, SkycastError};

/// A predictor shared between request handlers
pub type SharedPredictor = Arc<Mutex<WeatherPredictor>>;

/// Latest reading together with its sky condition label
#[derive(Debug, Clone, Serialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub sky_condition: String,
    pub timestamp: String,
    pub location: String,
}

pub struct WeatherPredictor {
    location: Location,
    store: ObservationStore,
    source: Arc<dyn WeatherSource>,
    clock: Arc<dyn Clock>,
    archive: HistoryArchive,
    limiter: RateLimiter,
    rng: StdRng,
    settings: PredictorConfig,
}

impl WeatherPredictor {
    /// Build a predictor from configuration
    #[must_use]
    pub fn new(config: &SkycastConfig, source: Arc<dyn WeatherSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            location: Location::from(&config.location),
            store: ObservationStore::new(config.predictor.max_readings),
            source,
            clock,
            archive: HistoryArchive::new(config.storage.history_path.clone()),
            limiter: RateLimiter::new(config.weather.min_api_interval()),
            rng: StdRng::from_os_rng(),
            settings: config.predictor.clone(),
        }
    }

    /// Replace the noise generator with a seeded one, making forecasts repeatable.
    #[must_use]
    pub fn with_noise_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn into_shared(self) -> SharedPredictor {
        Arc::new(Mutex::new(self))
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    #[must_use]
    pub fn store(&self) -> &ObservationStore {
        &self.store
    }

    #[must_use]
    pub fn min_training_readings(&self) -> usize {
        self.settings.min_training_readings
    }

    #[must_use]
    pub fn has_enough_data(&self) -> bool {
        self.store.len() >= self.settings.min_training_readings
    }

    /// Fetch one live reading and append it to the store.
    ///
    /// Waits out the minimum request interval first. On failure the store is untouched.
    #[instrument(skip(self), fields(location = %self.location.name))]
    pub async fn fetch_current(&mut self) -> Result<Reading> {
        self.limiter.acquire().await;

        let observation = self.source.current(&self.location).await.inspect_err(|e| {
            error!("Error fetching sensor data: {}", e);
        })?;

        let reading = Reading::new(
            self.clock.now(),
            observation.temperature,
            observation.humidity,
            observation.pressure,
        );
        if !reading.is_finite() {
            return Err(SkycastError::data_format(
                "Current observation contains non-finite values",
            ));
        }

        let evicted = self.store.append(reading);
        info!(
            "Current weather in {}: {:.1}°C, {:.0}% humidity, {:.1} hPa",
            self.location.name, reading.temperature, reading.humidity, reading.pressure
        );
        if evicted.is_some() {
            info!("Replaced oldest reading. Current size: {} readings", self.store.len());
        } else {
            info!("Added new reading. Current size: {} readings", self.store.len());
        }
        Ok(reading)
    }

    /// Download the archive window ending yesterday and persist the valid rows.
    #[instrument(skip(self), fields(location = %self.location.name))]
    pub async fn download_history(&mut self) -> Result<DownloadSummary> {
        let today = self.clock.now().date();
        let (start, end) = history::archive_window(today, self.settings.history_days);
        info!(
            "Downloading history from {} to {} (expecting {} readings)",
            start,
            end,
            u64::from(self.settings.history_days) * 24
        );

        let series = self
            .source
            .hourly_archive(&self.location, start, end)
            .await?;
        let (readings, summary) = history::filter_hourly(&series);
        info!(
            "Received: {} readings, valid: {}, invalid: {}",
            summary.received, summary.valid, summary.invalid
        );

        self.archive.write(&readings)?;
        Ok(summary)
    }

    /// Replace the store's contents with the persisted archive.
    #[instrument(skip(self))]
    pub fn load_history(&mut self) -> Result<LoadSummary> {
        let (readings, summary) = self.archive.read()?;
        self.store.replace_all(readings);
        info!(
            "Data summary: total rows {}, skipped {}, training data {} readings",
            summary.total, summary.skipped, summary.accepted
        );
        Ok(summary)
    }

    /// Download then load the history. Loading only runs after a successful download.
    pub async fn initialize(&mut self) -> Result<LoadSummary> {
        info!(
            "Initializing weather predictor for {} ({})",
            self.location.name,
            self.location.format_coordinates()
        );
        self.download_history().await?;
        self.load_history()
    }

    /// Train fresh models on the current window, off the async runtime.
    pub async fn train_models(&self) -> Result<TrainedModels> {
        if !self.has_enough_data() {
            return Err(SkycastError::insufficient_data(
                self.settings.min_training_readings,
                self.store.len(),
            ));
        }

        let window = self.store.recent_window(self.settings.max_readings);
        let settings = TrainerSettings::from(&self.settings);

        tokio::task::spawn_blocking(move || train(&window, &settings))
            .await
            .map_err(|e| SkycastError::validation(format!("training task failed: {e}")))?
    }

    /// Retrain on the current history and forecast the coming days.
    #[instrument(skip(self), fields(readings = self.store.len()))]
    pub async fn predict_weather(&mut self) -> Result<Forecast> {
        let models = self.train_models().await.inspect_err(|e| {
            warn!("Training failed: {}", e);
        })?;
        info!("Models trained on {} readings", models.samples());

        let latest = *self
            .store
            .latest()
            .ok_or_else(|| SkycastError::insufficient_data(self.settings.min_training_readings, 0))?;
        let now = self.clock.now();
        let settings = ForecastSettings::from(&self.settings);

        let entries = forecaster::generate(&models, &latest, now, &settings, &mut self.rng)?;
        Ok(Forecast::new(now, entries))
    }

    /// Latest stored reading and its label, if any reading exists
    #[must_use]
    pub fn current_conditions(&self) -> Option<CurrentConditions> {
        self.store.latest().map(|reading| CurrentConditions {
            temperature: reading.temperature,
            humidity: reading.humidity,
            pressure: reading.pressure,
            sky_condition: classify(reading.temperature, reading.humidity, reading.pressure),
            timestamp: reading.format_timestamp(),
            location: self.location.name.clone(),
        })
    }
}
