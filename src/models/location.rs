//! Location model for the observed coordinate

use serde::{Deserialize, Serialize};

use crate::config::LocationConfig;

/// The fixed point whose weather is observed and forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// City name shown in API responses
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// IANA timezone requested from the weather API
    pub timezone: String,
}

impl Location {
    #[must_use]
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64, timezone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            timezone: timezone.into(),
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

impl From<&LocationConfig> for Location {
    fn from(config: &LocationConfig) -> Self {
        Self::new(
            config.city.clone(),
            config.latitude,
            config.longitude,
            config.timezone.clone(),
        )
    }
}
