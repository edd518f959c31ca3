//! Integration tests for the SkyCast HTTP API and forecasting pipeline

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use skycast::weather::{CurrentObservation, HourlySeries};
use skycast::{
    FixedClock, Location, Result, SharedPredictor, SkycastConfig, SkycastError, WeatherPredictor,
    WeatherSource, web,
};

/// Weather source serving canned values
struct FakeSource {
    current: Option<CurrentObservation>,
    archive_hours: i64,
}

#[async_trait]
impl WeatherSource for FakeSource {
    async fn current(&self, _location: &Location) -> Result<CurrentObservation> {
        self.current
            .ok_or_else(|| SkycastError::network("Open-Meteo returned 503 Service Unavailable"))
    }

    async fn hourly_archive(
        &self,
        _location: &Location,
        start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<HourlySeries> {
        let origin = start.and_hms_opt(0, 0, 0).unwrap();
        let hours = 0..self.archive_hours;
        Ok(HourlySeries {
            time: hours
                .clone()
                .map(|i| (origin + Duration::hours(i)).format("%Y-%m-%dT%H:%M").to_string())
                .collect(),
            temperature: hours
                .clone()
                .map(|i| Some(27.0 + (i % 24) as f64 * 0.25))
                .collect(),
            humidity: hours
                .clone()
                .map(|i| Some(70.0 + (i % 8) as f64 * 2.0))
                .collect(),
            pressure: hours
                .map(|i| Some(1002.0 + (i % 6) as f64 * 0.5))
                .collect(),
        })
    }
}

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, 15)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn kolkata_afternoon() -> CurrentObservation {
    CurrentObservation {
        temperature: 33.5,
        humidity: 95.0,
        pressure: 998.0,
    }
}

async fn setup(source: FakeSource, initialize: bool) -> (SharedPredictor, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = SkycastConfig::default();
    config.storage.history_path = dir.path().join("data").join("history.csv");
    config.weather.min_api_interval_ms = 0;
    config.predictor.n_estimators = 10;

    let mut predictor = WeatherPredictor::new(
        &config,
        Arc::new(source),
        Arc::new(FixedClock::new(fixed_now())),
    )
    .with_noise_seed(7);
    if initialize {
        predictor.initialize().await.unwrap();
    }
    (predictor.into_shared(), dir)
}

async fn get(predictor: &SharedPredictor, uri: &str) -> (StatusCode, Value) {
    let response = web::app(predictor.clone())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_reports_reading_count() {
    let (predictor, _dir) = setup(
        FakeSource {
            current: Some(kolkata_afternoon()),
            archive_hours: 48,
        },
        true,
    )
    .await;

    let (status, body) = get(&predictor, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["readings"], 48);
}

#[tokio::test]
async fn test_current_weather_returns_latest_reading() {
    let (predictor, _dir) = setup(
        FakeSource {
            current: Some(kolkata_afternoon()),
            archive_hours: 0,
        },
        false,
    )
    .await;

    let (status, body) = get(&predictor, "/api/current-weather").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["temperature"], 33.5);
    assert_eq!(data["humidity"], 95.0);
    assert_eq!(data["pressure"], 998.0);
    assert_eq!(data["sky_condition"], "Hot, Rainy, Strong wind");
    assert_eq!(data["timestamp"], "2024-07-15 09:30:00");
    assert_eq!(data["location"], "Kolkata");

    assert_eq!(predictor.lock().await.store().len(), 1);
}

#[tokio::test]
async fn test_current_weather_fetch_failure_is_500() {
    let (predictor, _dir) = setup(
        FakeSource {
            current: None,
            archive_hours: 24,
        },
        true,
    )
    .await;

    let (status, body) = get(&predictor, "/api/current-weather").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], 500);
    assert_eq!(
        body["error"]["message"],
        "Failed to fetch current weather data"
    );
    assert!(body.get("message").is_none());
    assert!(body.get("data").is_none());

    assert_eq!(predictor.lock().await.store().len(), 24);
}

#[tokio::test]
async fn test_forecast_with_too_little_history_is_404() {
    let (predictor, _dir) = setup(
        FakeSource {
            current: Some(kolkata_afternoon()),
            archive_hours: 239,
        },
        true,
    )
    .await;

    let (status, body) = get(&predictor, "/api/weather-forecast").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], 404);
    assert_eq!(
        body["error"]["message"],
        "Insufficient historical data for prediction. Need at least 240 readings."
    );
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn test_forecast_returns_seven_days() {
    let (predictor, _dir) = setup(
        FakeSource {
            current: Some(kolkata_afternoon()),
            archive_hours: 720,
        },
        true,
    )
    .await;

    let (status, body) = get(&predictor, "/api/weather-forecast").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["generated_at"], "2024-07-15 09:30:00");
    assert_eq!(body["message"], "7-day forecast for Kolkata");
    assert!(body.get("error").is_none());

    let forecast = body["data"]["forecast"].as_array().unwrap();
    assert_eq!(forecast.len(), 7);
    assert_eq!(forecast[0]["date"], "2024-07-15");
    assert_eq!(forecast[6]["date"], "2024-07-21");

    for day in forecast {
        let min = day["min_temperature"].as_f64().unwrap();
        let max = day["max_temperature"].as_f64().unwrap();
        let humidity = day["humidity"].as_f64().unwrap();
        assert!(min <= max);
        assert!((0.0..=100.0).contains(&humidity));
        assert!(day["pressure"].as_f64().unwrap() > 900.0);
    }
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let (predictor, _dir) = setup(
        FakeSource {
            current: Some(kolkata_afternoon()),
            archive_hours: 0,
        },
        false,
    )
    .await;

    let response = web::app(predictor)
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (predictor, _dir) = setup(
        FakeSource {
            current: Some(kolkata_afternoon()),
            archive_hours: 0,
        },
        false,
    )
    .await;

    let (status, _) = get(&predictor, "/api/not-a-route").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_history_reload_from_archive() {
    let (predictor, dir) = setup(
        FakeSource {
            current: Some(kolkata_afternoon()),
            archive_hours: 300,
        },
        true,
    )
    .await;

    let archive = dir.path().join("data").join("history.csv");
    let contents = std::fs::read_to_string(&archive).unwrap();
    assert!(contents.starts_with("timestamp,temperature,humidity,pressure\n"));
    assert_eq!(contents.lines().count(), 301);

    let mut predictor = predictor.lock().await;
    predictor.fetch_current().await.unwrap();
    assert_eq!(predictor.store().len(), 301);

    let summary = predictor.load_history().unwrap();
    assert_eq!(summary.accepted, 300);
    assert_eq!(predictor.store().len(), 300);
}
