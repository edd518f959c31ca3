//! `SkyCast` - rolling-history weather forecasting for a single location
//!
//! This library keeps a bounded history of hourly observations, retrains
//! three random-forest regressors on every forecast request and serves the
//! resulting multi-day forecast over HTTP or on the console.

pub mod api;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod driver;
pub mod error;
pub mod forecaster;
pub mod history;
pub mod logging;
pub mod models;
pub mod predictor;
pub mod regression;
pub mod store;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use classifier::{SkyCondition, classify};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::SkycastConfig;
pub use error::SkycastError;
pub use models::{Forecast, ForecastEntry, Location, Reading};
pub use predictor::{CurrentConditions, SharedPredictor, WeatherPredictor};
pub use store::ObservationStore;
pub use weather::{OpenMeteoClient, WeatherSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SkycastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
