//! Data models for the SkyCast forecaster
//!
//! This module contains the core domain models organized by concern:
//! - Reading: one timestamped observation
//! - Forecast: per-day predictions and their table rendering
//! - Location: the single configured place being observed

pub mod forecast;
pub mod location;
pub mod reading;

// Re-export all public types for convenient access
pub use forecast::{Forecast, ForecastEntry};
pub use location::Location;
pub use reading::Reading;
