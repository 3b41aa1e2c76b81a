//! `WeatherSite` - search a place by name and show its weather forecast
//!
//! This library provides the search-to-forecast pipeline: place
//! autocomplete, place resolution, daily forecast retrieval and
//! normalization into a display-ready bundle.

pub mod config;
pub mod display;
pub mod error;
pub mod http;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod places;
pub mod session;
pub mod weather;

// Re-export core types for public API
pub use config::WeatherSiteConfig;
pub use error::WeatherSiteError;
pub use models::{DailyForecast, ForecastBundle, GeoPoint, Location, Suggestion, Weather};
pub use places::{GooglePlacesClient, PlaceProvider};
pub use session::{PipelineSettings, PipelineState, RunId, RunOutcome, SearchSession, Stage, SuggestOutcome};
pub use weather::{ForecastProvider, RawForecast, RawForecastDay, WeatherbitClient};

use std::sync::Arc;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherSiteError>;

/// Build a session backed by the HTTP providers, sharing one HTTP client
pub fn session_from_config(config: &WeatherSiteConfig) -> anyhow::Result<SearchSession> {
    let client = http::build_client(config.timeout())?;
    let places_key = config
        .places
        .api_key
        .clone()
        .ok_or_else(|| WeatherSiteError::config("Places API key is required"))?;
    let forecast_key = config
        .forecast
        .api_key
        .clone()
        .ok_or_else(|| WeatherSiteError::config("Forecast API key is required"))?;

    let places = GooglePlacesClient::with_client(client.clone(), &config.places.base_url, places_key);
    let forecasts = WeatherbitClient::with_client(client, &config.forecast.base_url, forecast_key);

    Ok(SearchSession::new(
        Arc::new(places),
        Arc::new(forecasts),
        PipelineSettings::from_config(config)?,
    ))
}
