//! Forecast normalization
//!
//! Maps provider day records into [`DailyForecast`]s and splits them into
//! today and the upcoming days.

use crate::models::{DailyForecast, ForecastBundle, GeoPoint, Location, Weather};
use crate::weather::{RawForecast, RawForecastDay};
use crate::{Result, WeatherSiteError};
use chrono::{Locale, NaiveDate};

/// `DD.MM` from an ISO `YYYY-MM-DD` string by fixed-offset slicing.
///
/// Positions past the end of the input yield empty parts, so malformed dates
/// produce truncated output instead of an error.
#[must_use]
pub fn format_date(raw: &str) -> String {
    let day: String = raw.chars().skip(8).take(2).collect();
    let month: String = raw.chars().skip(5).take(2).collect();
    format!("{day}.{month}")
}

/// Long weekday name of an ISO date in `locale`
pub fn format_day_name(raw: &str, locale: Locale) -> Result<String> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
        WeatherSiteError::shape(format!("Cannot resolve weekday of '{raw}': {e}"))
    })?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| WeatherSiteError::shape(format!("Invalid date '{raw}'")))?
        .and_utc();
    Ok(midnight.format_localized("%A", locale).to_string())
}

/// Normalize one provider record
pub fn normalize_day(day: &RawForecastDay, locale: Locale) -> Result<DailyForecast> {
    Ok(DailyForecast {
        date: format_date(&day.datetime),
        day_name: format_day_name(&day.datetime, locale)?,
        temp: day.temp,
        min_temp: day.min_temp,
        max_temp: day.max_temp,
        rain: day.precip,
        weather: Weather {
            description: day.weather.description.clone(),
            icon: day.weather.icon.clone(),
        },
    })
}

/// Build the display bundle, or `None` when the provider returned no days
pub fn build_bundle(
    forecast: &RawForecast,
    point: GeoPoint,
    locale: Locale,
) -> Result<Option<ForecastBundle>> {
    let mut days = forecast
        .data
        .iter()
        .map(|day| normalize_day(day, locale))
        .collect::<Result<Vec<_>>>()?
        .into_iter();

    let Some(today) = days.next() else {
        return Ok(None);
    };

    Ok(Some(ForecastBundle {
        today,
        upcoming: days.collect(),
        location: Location::new(
            forecast.city_name.clone(),
            forecast.country_code.clone(),
            point,
        ),
    }))
}
