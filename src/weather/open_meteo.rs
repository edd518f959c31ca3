//! Open-Meteo client for the live forecast and historical archive endpoints

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

use super::{CurrentObservation, HourlySeries, REQUESTED_FIELDS, WeatherSource};
use crate::config::WeatherConfig;
use crate::models::Location;
use crate::{Result, SkycastError};

/// HTTP client for the Open-Meteo API
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    /// Base URL; `/forecast` is appended for current conditions
    base_url: String,
    /// Full archive endpoint URL
    archive_url: String,
}

impl OpenMeteoClient {
    /// Create a new client with the configured endpoints and optional timeout
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("SkyCast/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SkycastError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            archive_url: config.archive_url.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let start_time = Instant::now();
        debug!("Open-Meteo request: {} {:?}", url, query);

        let response = self.client.get(url).query(query).send().await?;
        let response = check_status(response).await?;
        let body = response.json::<T>().await.map_err(|e| {
            error!("Failed to parse Open-Meteo response: {}", e);
            SkycastError::data_format(format!("Invalid response from Open-Meteo: {e}"))
        })?;

        let total_duration = start_time.elapsed();
        if total_duration > Duration::from_secs(5) {
            warn!(
                "Slow Open-Meteo response: {:.3}s",
                total_duration.as_secs_f64()
            );
        }
        Ok(body)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SkycastError::network(format!(
        "Open-Meteo returned {status}: {}",
        body.trim()
    )))
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    #[instrument(skip(self, location), fields(lat = location.latitude, lon = location.longitude))]
    async fn current(&self, location: &Location) -> Result<CurrentObservation> {
        let url = format!("{}/forecast", self.base_url);
        let query = [
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("current", REQUESTED_FIELDS.to_string()),
            ("timezone", location.timezone.clone()),
        ];

        let response: CurrentResponse = self.get_json(&url, &query).await?;
        let observation = response.into_observation()?;
        debug!("Current conditions: {:?}", observation);
        Ok(observation)
    }

    #[instrument(skip(self, location), fields(lat = location.latitude, lon = location.longitude))]
    async fn hourly_archive(
        &self,
        location: &Location,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HourlySeries> {
        let query = [
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("start_date", start.format("%Y-%m-%d").to_string()),
            ("end_date", end.format("%Y-%m-%d").to_string()),
            ("hourly", REQUESTED_FIELDS.to_string()),
            ("timezone", location.timezone.clone()),
        ];

        let response: ArchiveResponse = self.get_json(&self.archive_url, &query).await?;
        let series = response.into_series()?;
        info!(
            "Received {} hourly archive rows for {} to {}",
            series.len(),
            start,
            end
        );
        Ok(series)
    }
}

/// Response of `GET /forecast?current=...`
#[derive(Debug, serde::Deserialize)]
pub struct CurrentResponse {
    pub current: Option<CurrentData>,
}

#[derive(Debug, serde::Deserialize)]
pub struct CurrentData {
    #[serde(rename = "temperature_2m")]
    pub temperature: Option<f64>,
    #[serde(rename = "relative_humidity_2m")]
    pub humidity: Option<f64>,
    #[serde(rename = "pressure_msl")]
    pub pressure: Option<f64>,
}

impl CurrentResponse {
    /// Extract the three values, rejecting missing or non-finite ones
    pub fn into_observation(self) -> Result<CurrentObservation> {
        let current = self.current.ok_or_else(|| {
            SkycastError::data_format("Invalid API response format - 'current' data missing")
        })?;

        let field = |value: Option<f64>, name: &str| {
            value.filter(|v| v.is_finite()).ok_or_else(|| {
                SkycastError::data_format(format!("Current '{name}' value missing or not finite"))
            })
        };

        Ok(CurrentObservation {
            temperature: field(current.temperature, "temperature_2m")?,
            humidity: field(current.humidity, "relative_humidity_2m")?,
            pressure: field(current.pressure, "pressure_msl")?,
        })
    }
}

/// Response of the archive endpoint
#[derive(Debug, serde::Deserialize)]
pub struct ArchiveResponse {
    pub hourly: Option<HourlyData>,
}

#[derive(Debug, serde::Deserialize)]
pub struct HourlyData {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m", default)]
    pub temperature: Vec<Option<f64>>,
    #[serde(rename = "relative_humidity_2m", default)]
    pub humidity: Vec<Option<f64>>,
    #[serde(rename = "pressure_msl", default)]
    pub pressure: Vec<Option<f64>>,
}

impl ArchiveResponse {
    pub fn into_series(self) -> Result<HourlySeries> {
        let hourly = self.hourly.ok_or_else(|| {
            SkycastError::data_format("Invalid API response format - 'hourly' data missing")
        })?;

        Ok(HourlySeries {
            time: hourly.time,
            temperature: hourly.temperature,
            humidity: hourly.humidity,
            pressure: hourly.pressure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_current_response() {
        let json = r#"{
            "latitude": 22.5,
            "longitude": 88.375,
            "timezone": "Asia/Kolkata",
            "current": {
                "time": "2024-05-01T14:15",
                "interval": 900,
                "temperature_2m": 33.4,
                "relative_humidity_2m": 58,
                "pressure_msl": 1004.7
            }
        }"#;

        let response: CurrentResponse = serde_json::from_str(json).unwrap();
        let observation = response.into_observation().unwrap();
        assert_eq!(observation.temperature, 33.4);
        assert_eq!(observation.humidity, 58.0);
        assert_eq!(observation.pressure, 1004.7);
    }

    #[test]
    fn test_current_response_missing_block() {
        let response: CurrentResponse = serde_json::from_str(r#"{"latitude": 1.0}"#).unwrap();
        let err = response.into_observation().unwrap_err();
        assert!(matches!(err, SkycastError::DataFormat { .. }));
    }

    #[test]
    fn test_current_response_null_value() {
        let json = r#"{"current": {"temperature_2m": 20.0, "relative_humidity_2m": null, "pressure_msl": 1000.0}}"#;
        let response: CurrentResponse = serde_json::from_str(json).unwrap();
        let err = response.into_observation().unwrap_err();
        assert!(err.to_string().contains("relative_humidity_2m"));
    }

    #[test]
    fn test_parse_archive_response_with_gaps() {
        let json = r#"{
            "hourly": {
                "time": ["2024-05-01T00:00", "2024-05-01T01:00"],
                "temperature_2m": [29.1, null],
                "relative_humidity_2m": [80, 82],
                "pressure_msl": [1003.2, 1003.0]
            }
        }"#;

        let response: ArchiveResponse = serde_json::from_str(json).unwrap();
        let series = response.into_series().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.temperature, vec![Some(29.1), None]);
        assert_eq!(series.humidity, vec![Some(80.0), Some(82.0)]);
    }

    #[test]
    fn test_archive_response_missing_hourly() {
        let response: ArchiveResponse =
            serde_json::from_str(r#"{"error": true, "reason": "bad dates"}"#).unwrap();
        assert!(matches!(
            response.into_series(),
            Err(SkycastError::DataFormat { .. })
        ));
    }

    #[test]
    fn test_client_trims_base_url() {
        let config = WeatherConfig {
            base_url: "https://api.open-meteo.com/v1/".to_string(),
            ..WeatherConfig::default()
        };
        let client = OpenMeteoClient::new(&config).unwrap();
        assert_eq!(client.base_url, "https://api.open-meteo.com/v1");
    }

    #[test]
    fn test_client_builds_with_and_without_timeout() {
        assert!(OpenMeteoClient::new(&WeatherConfig::default()).is_ok());

        let config = WeatherConfig {
            timeout_seconds: Some(10),
            ..WeatherConfig::default()
        };
        assert!(OpenMeteoClient::new(&config).is_ok());
    }
}
