//! Location model for geographic coordinates and metadata

use serde::{Deserialize, Serialize};

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both coordinates are finite and inside their valid ranges
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Format point as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Resolved location attached to a forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// City name as reported by the forecast provider
    pub name: String,
    /// Country code (ISO 3166-1 alpha-2)
    pub country_code: String,
    /// Coordinates the forecast was requested for
    pub point: GeoPoint,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(name: String, country_code: String, point: GeoPoint) -> Self {
        Self {
            name,
            country_code,
            point,
        }
    }

    /// Name with country code, e.g. `Berlin (DE)`
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.country_code.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.country_code)
        }
    }
}
