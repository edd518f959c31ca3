//! Console driver: fetch, forecast and print on a fixed interval

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::DriverConfig;
use crate::models::Forecast;
use crate::predictor::SharedPredictor;
use crate::Result;

/// What one fetch-and-forecast cycle produced
#[derive(Debug)]
pub enum CycleOutcome {
    Forecast(Forecast),
    /// The forecast came back empty; only this cycle is dropped
    Abandoned,
}

pub struct Driver {
    predictor: SharedPredictor,
    interval: Duration,
    error_pause: Duration,
}

impl Driver {
    #[must_use]
    pub fn new(predictor: SharedPredictor, config: &DriverConfig) -> Self {
        Self {
            predictor,
            interval: Duration::from_secs(config.update_interval_seconds),
            error_pause: Duration::from_secs(config.error_pause_seconds),
        }
    }

    /// Fetch one reading, retrain and forecast.
    ///
    /// Too few readings to train is returned as an error like any other failure.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let mut predictor = self.predictor.lock().await;
        predictor.fetch_current().await?;

        let forecast = predictor.predict_weather().await?;
        if forecast.is_empty() {
            return Ok(CycleOutcome::Abandoned);
        }
        Ok(CycleOutcome::Forecast(forecast))
    }

    /// Run an immediate cycle, then one per interval until cancelled.
    ///
    /// A failed cycle is logged and followed by a short pause before the next wait.
    /// An abandoned cycle skips straight to the next wait.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let mut first = true;

        loop {
            if !first {
                info!("Next update in {}s", self.interval.as_secs());
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(self.interval) => {}
                }
            }
            first = false;

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                outcome = self.run_cycle() => outcome,
            };

            match outcome {
                Ok(CycleOutcome::Forecast(forecast)) => {
                    println!("{}", forecast.render_table());
                }
                Ok(CycleOutcome::Abandoned) => {
                    warn!("Forecast came back empty, skipping this cycle");
                }
                Err(e) => {
                    error!("Error in main loop: {}", e);
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(self.error_pause) => {}
                    }
                }
            }
        }

        info!("Stopping weather prediction loop");
        Ok(())
    }
}
