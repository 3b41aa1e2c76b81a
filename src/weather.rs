//! Forecast provider integration (Weatherbit daily forecast)

use crate::http;
use crate::models::GeoPoint;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, instrument, warn};

pub use weatherbit::{RawForecast, RawForecastDay, RawWeather};

/// Source of daily forecast records for a coordinate
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Daily records for `point`, chronological from today
    async fn daily_forecast(&self, point: GeoPoint, days: u8) -> Result<RawForecast>;
}

/// Weatherbit daily forecast client
pub struct WeatherbitClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherbitClient {
    /// Create a client sharing an existing HTTP client
    pub fn with_client(client: Client, base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ForecastProvider for WeatherbitClient {
    #[instrument(skip(self), fields(lat = point.latitude, lon = point.longitude))]
    async fn daily_forecast(&self, point: GeoPoint, days: u8) -> Result<RawForecast> {
        let url = format!(
            "{}/forecast/daily?lat={}&lon={}&days={}&key={}",
            self.base_url,
            point.latitude,
            point.longitude,
            days,
            urlencoding::encode(&self.api_key)
        );

        let forecast: RawForecast = http::get_json(&self.client, &url).await?;

        // Record count is not enforced here; normalization copes with short lists.
        if forecast.data.len() != usize::from(days) {
            warn!(
                "Requested {} days but provider returned {}",
                days,
                forecast.data.len()
            );
        }
        info!(
            "Retrieved {} daily records for {} ({})",
            forecast.data.len(),
            forecast.city_name,
            forecast.country_code
        );

        Ok(forecast)
    }
}

/// Weatherbit API response structures
mod weatherbit {
    use serde::Deserialize;

    /// Daily forecast response
    #[derive(Debug, Clone, Deserialize, PartialEq)]
    pub struct RawForecast {
        #[serde(default)]
        pub city_name: String,
        #[serde(default)]
        pub country_code: String,
        #[serde(default)]
        pub data: Vec<RawForecastDay>,
    }

    /// One daily record as sent by the provider
    #[derive(Debug, Clone, Deserialize, PartialEq)]
    pub struct RawForecastDay {
        /// Local date, `YYYY-MM-DD`
        pub datetime: String,
        pub temp: f64,
        pub min_temp: f64,
        pub max_temp: f64,
        /// Accumulated precipitation in mm
        pub precip: f64,
        pub weather: RawWeather,
    }

    #[derive(Debug, Clone, Deserialize, PartialEq)]
    pub struct RawWeather {
        pub description: String,
        pub icon: String,
    }
}
