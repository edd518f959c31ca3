//! Weather data sources
//!
//! The predictor talks to a [`WeatherSource`]; [`open_meteo::OpenMeteoClient`]
//! is the production implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::models::Location;

pub mod open_meteo;
pub mod rate_limit;

pub use open_meteo::OpenMeteoClient;
pub use rate_limit::RateLimiter;

/// Hourly fields requested from both endpoints
pub const REQUESTED_FIELDS: &str = "temperature_2m,relative_humidity_2m,pressure_msl";

/// Current conditions reported by the live endpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentObservation {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
}

/// Parallel hourly arrays from the archive endpoint.
///
/// Value arrays may contain gaps (`None`) and may be shorter than `time`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature: Vec<Option<f64>>,
    pub humidity: Vec<Option<f64>>,
    pub pressure: Vec<Option<f64>>,
}

impl HourlySeries {
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Live and archive weather endpoints for a single location
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch current temperature, relative humidity and sea-level pressure.
    async fn current(&self, location: &Location) -> Result<CurrentObservation>;

    /// Fetch hourly values for every hour of `start..=end`.
    async fn hourly_archive(
        &self,
        location: &Location,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HourlySeries>;
}
