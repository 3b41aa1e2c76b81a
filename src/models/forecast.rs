//! Normalized forecast models

use super::Location;
use serde::{Deserialize, Serialize};

/// Weather condition for one day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Weather {
    /// Human-readable description of weather conditions
    pub description: String,
    /// Provider icon code, e.g. `c04d`
    pub icon: String,
}

impl Weather {
    /// Icon image URL under the given base, `{base}/{icon}.png`
    #[must_use]
    pub fn icon_url(&self, base_url: &str) -> String {
        format!("{}/{}.png", base_url.trim_end_matches('/'), self.icon)
    }
}

/// Display-ready forecast for a single day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    /// Day and month as `DD.MM`
    pub date: String,
    /// Long weekday name in the configured locale
    pub day_name: String,
    /// Average temperature
    pub temp: f64,
    /// Minimum temperature
    pub min_temp: f64,
    /// Maximum temperature
    pub max_temp: f64,
    /// Precipitation amount in mm
    pub rain: f64,
    pub weather: Weather,
}

/// Normalized forecast for one resolved location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastBundle {
    /// First day of the provider sequence
    pub today: DailyForecast,
    /// Remaining days in chronological order, today excluded
    pub upcoming: Vec<DailyForecast>,
    pub location: Location,
}
