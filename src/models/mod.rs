//! Data models for the `WeatherSite` pipeline
//!
//! This module contains the domain models organized by concern:
//! - Location: geographic coordinates and resolved place metadata
//! - Suggestion: autocomplete candidates offered while typing
//! - Forecast: normalized daily forecasts and the display bundle

pub mod forecast;
pub mod location;
pub mod suggestion;

// Re-export all public types for convenient access
pub use forecast::{DailyForecast, ForecastBundle, Weather};
pub use location::{GeoPoint, Location};
pub use suggestion::Suggestion;
