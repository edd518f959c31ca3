//! HTTP API for current conditions and forecasts
//!
//! Every route answers with the same JSON envelope: `success`, plus `data`
//! and an optional `message` on success, or `error` carrying the HTTP status
//! and a user-facing message on failure.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::SkycastError;
use crate::models::ForecastEntry;
use crate::models::reading::DISPLAY_FORMAT;
use crate::predictor::{CurrentConditions, SharedPredictor};

/// Error body: user-facing text and the HTTP status code
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
    pub code: u16,
}

/// Response envelope shared by all routes
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(ApiError {
                message: message.into(),
                code: status.as_u16(),
            }),
        }
    }
}

/// An error status paired with its envelope
pub struct ApiFailure {
    status: StatusCode,
    body: ApiResponse<()>,
}

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiResponse::failure(status, message),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiFailure>;

#[derive(Debug, Serialize)]
pub struct ForecastPayload {
    pub forecast: Vec<ForecastEntry>,
    pub generated_at: String,
}

#[derive(Debug, Serialize)]
pub struct HealthPayload {
    pub status: &'static str,
    pub readings: usize,
}

pub fn router(predictor: SharedPredictor) -> Router {
    Router::new()
        .route("/current-weather", get(get_current_weather))
        .route("/weather-forecast", get(get_weather_forecast))
        .route("/health", get(get_health))
        .with_state(predictor)
}

async fn get_current_weather(
    State(predictor): State<SharedPredictor>,
) -> ApiResult<CurrentConditions> {
    let mut predictor = predictor.lock().await;

    if let Err(e) = predictor.fetch_current().await {
        error!("Current weather request failed: {}", e);
        return Err(ApiFailure::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch current weather data",
        ));
    }

    let conditions = predictor.current_conditions().ok_or_else(|| {
        ApiFailure::new(StatusCode::NOT_FOUND, "No weather data available yet")
    })?;

    Ok(Json(ApiResponse::ok(conditions)))
}

async fn get_weather_forecast(
    State(predictor): State<SharedPredictor>,
) -> ApiResult<ForecastPayload> {
    let mut predictor = predictor.lock().await;

    if !predictor.has_enough_data() {
        let err = SkycastError::insufficient_data(
            predictor.min_training_readings(),
            predictor.store().len(),
        );
        warn!("Forecast requested too early: {}", err);
        return Err(ApiFailure::new(StatusCode::NOT_FOUND, err.user_message()));
    }

    let forecast = predictor.predict_weather().await.map_err(|e| match e {
        SkycastError::InsufficientData { .. } => {
            ApiFailure::new(StatusCode::NOT_FOUND, e.user_message())
        }
        _ => {
            error!("Forecast request failed: {}", e);
            ApiFailure::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to generate forecast. {}", e.user_message()),
            )
        }
    })?;

    if forecast.is_empty() {
        return Err(ApiFailure::new(
            StatusCode::NOT_FOUND,
            "Unable to generate forecast. Prediction failed.",
        ));
    }

    let days = forecast.len();
    info!("Served {}-day forecast", days);
    let location = predictor.location().name.clone();
    Ok(Json(
        ApiResponse::ok(ForecastPayload {
            generated_at: format_generated_at(forecast.generated_at),
            forecast: forecast.entries,
        })
        .with_message(format!("{days}-day forecast for {location}")),
    ))
}

async fn get_health(State(predictor): State<SharedPredictor>) -> ApiResult<HealthPayload> {
    let readings = predictor.lock().await.store().len();
    Ok(Json(ApiResponse::ok(HealthPayload {
        status: "ok",
        readings,
    })))
}

fn format_generated_at(generated_at: NaiveDateTime) -> String {
    generated_at.format(DISPLAY_FORMAT).to_string()
}
