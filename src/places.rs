//! Place provider integration (Google Places)
//!
//! Turns free text into ranked place suggestions and a selected place id
//! into coordinates.

use crate::http;
use crate::models::{GeoPoint, Suggestion};
use crate::{Result, WeatherSiteError};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

/// Source of place suggestions and coordinates
#[async_trait]
pub trait PlaceProvider: Send + Sync {
    /// Suggestions for `query` in provider relevance order
    async fn autocomplete(&self, query: &str) -> Result<Vec<Suggestion>>;

    /// Coordinates of the place with the given provider id
    async fn resolve(&self, place_id: &str) -> Result<GeoPoint>;
}

/// Google Places autocomplete and details client
pub struct GooglePlacesClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GooglePlacesClient {
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
impl PlaceProvider for GooglePlacesClient {
    #[instrument(skip(self))]
    async fn autocomplete(&self, query: &str) -> Result<Vec<Suggestion>> {
        if query.is_empty() {
            return Err(WeatherSiteError::EmptyInput);
        }

        let url = format!(
            "{}/autocomplete/json?input={}&key={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(&self.api_key)
        );

        let response: google::AutocompleteResponse = http::get_json(&self.client, &url).await?;
        google::check_status(response.status.as_deref(), response.error_message.as_deref())?;

        let predictions = response
            .predictions
            .ok_or_else(|| WeatherSiteError::shape("Autocomplete response has no predictions"))?;

        let suggestions: Vec<Suggestion> = predictions.into_iter().map(Suggestion::from).collect();

        if suggestions.is_empty() {
            warn!("No suggestions found for '{}'", query);
        } else {
            info!("Found {} suggestions for '{}'", suggestions.len(), query);
        }

        Ok(suggestions)
    }

    #[instrument(skip(self))]
    async fn resolve(&self, place_id: &str) -> Result<GeoPoint> {
        let url = format!(
            "{}/details/json?place_id={}&key={}",
            self.base_url,
            urlencoding::encode(place_id),
            urlencoding::encode(&self.api_key)
        );

        let response: google::DetailsResponse = http::get_json(&self.client, &url).await?;
        google::check_status(response.status.as_deref(), response.error_message.as_deref())?;

        let point = response.geo_point()?;
        debug!("Resolved place {} to {}", place_id, point.format_coordinates());
        Ok(point)
    }
}

/// Google Places API response structures
mod google {
    use super::{GeoPoint, Result, Suggestion, WeatherSiteError};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct AutocompleteResponse {
        pub predictions: Option<Vec<Prediction>>,
        pub status: Option<String>,
        pub error_message: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Prediction {
        pub place_id: String,
        pub description: String,
    }

    impl From<Prediction> for Suggestion {
        fn from(prediction: Prediction) -> Self {
            Suggestion::new(prediction.place_id, prediction.description)
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct DetailsResponse {
        pub result: Option<PlaceResult>,
        pub status: Option<String>,
        pub error_message: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct PlaceResult {
        pub geometry: Option<Geometry>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Geometry {
        pub location: Option<LatLng>,
    }

    #[derive(Debug, Deserialize)]
    pub struct LatLng {
        pub lat: Option<f64>,
        pub lng: Option<f64>,
    }

    impl DetailsResponse {
        /// Extract coordinates from `result.geometry.location`
        pub fn geo_point(&self) -> Result<GeoPoint> {
            let location = self
                .result
                .as_ref()
                .and_then(|result| result.geometry.as_ref())
                .and_then(|geometry| geometry.location.as_ref())
                .ok_or_else(|| WeatherSiteError::shape("Place details have no geometry location"))?;

            let (Some(lat), Some(lng)) = (location.lat, location.lng) else {
                return Err(WeatherSiteError::shape(
                    "Place geometry is missing latitude or longitude",
                ));
            };

            let point = GeoPoint::new(lat, lng);
            if !point.is_valid() {
                return Err(WeatherSiteError::shape(format!(
                    "Place geometry is out of range: {lat}, {lng}"
                )));
            }
            Ok(point)
        }
    }

    /// Map a non-OK provider status onto a transport error
    pub fn check_status(status: Option<&str>, error_message: Option<&str>) -> Result<()> {
        match status {
            None | Some("OK") | Some("ZERO_RESULTS") => Ok(()),
            Some(other) => Err(WeatherSiteError::transport(format!(
                "Place provider returned status {other}: {}",
                error_message.unwrap_or("no details")
            ))),
        }
    }
}
