//! Error types and handling for the `SkyCast` forecaster

use thiserror::Error;

/// Main error type for the `SkyCast` forecaster
#[derive(Error, Debug)]
pub enum SkycastError {
    /// Endpoint unreachable or returned a non-success status
    #[error("Network error: {message}")]
    Network { message: String },

    /// Response missing expected fields or carrying non-finite values
    #[error("Data format error: {message}")]
    DataFormat { message: String },

    /// Not enough readings stored to train the models
    #[error("Insufficient data for training: need at least {required} readings, got {available}")]
    InsufficientData { required: usize, available: usize },

    /// Archive read or write failure
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// A stored row field failed to parse
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl SkycastError {
    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new data format error
    pub fn data_format<S: Into<String>>(message: S) -> Self {
        Self::DataFormat {
            message: message.into(),
        }
    }

    /// Create a new insufficient data error
    #[must_use]
    pub fn insufficient_data(required: usize, available: usize) -> Self {
        Self::InsufficientData {
            required,
            available,
        }
    }

    /// Create a new persistence error
    pub fn persistence<S: Into<String>>(message: S) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SkycastError::Network { .. } => {
                "Unable to reach the weather service. Please check your internet connection."
                    .to_string()
            }
            SkycastError::DataFormat { .. } => {
                "The weather service returned data in an unexpected format.".to_string()
            }
            SkycastError::InsufficientData { required, .. } => {
                format!("Insufficient historical data for prediction. Need at least {required} readings.")
            }
            SkycastError::Persistence { .. } | SkycastError::Io { .. } => {
                "Reading or writing the history archive failed. Please check file permissions."
                    .to_string()
            }
            SkycastError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            SkycastError::Config { .. } => {
                "Configuration error. Please check your config file and environment.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for SkycastError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SkycastError::data_format(err.to_string())
        } else {
            SkycastError::network(err.to_string())
        }
    }
}

impl From<csv::Error> for SkycastError {
    fn from(err: csv::Error) -> Self {
        SkycastError::persistence(err.to_string())
    }
}
