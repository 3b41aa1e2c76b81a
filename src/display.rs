//! Terminal rendering of suggestions and forecasts

use crate::models::{DailyForecast, ForecastBundle, Suggestion};
use std::fmt::{self, Display};

/// Shown when no bundle has been committed yet
pub const NO_DATA: &str = "No Data Available";

/// Shown while a suggestion lookup is in flight
pub const LOADING: &str = "Loading...";

/// Temperature with a leading `+` above zero
#[must_use]
pub fn signed_temperature(temp: f64) -> String {
    if temp > 0.0 {
        format!("+{temp}")
    } else {
        format!("{temp}")
    }
}

/// Numbered suggestion list, one per line
pub struct SuggestionList<'a>(pub &'a [Suggestion]);

impl Display for SuggestionList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, suggestion) in self.0.iter().enumerate() {
            writeln!(f, "  [{index}] {}", suggestion.description)?;
        }
        Ok(())
    }
}

/// Today panel followed by the upcoming day list.
///
/// `expanded` selects an upcoming day whose details are shown.
pub struct BundleView<'a> {
    pub bundle: &'a ForecastBundle,
    pub icon_base_url: &'a str,
    pub expanded: Option<usize>,
}

impl Display for BundleView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let today = &self.bundle.today;
        writeln!(
            f,
            "{} {}",
            signed_temperature(today.temp),
            self.bundle.location.name
        )?;
        writeln!(f, "{}", today.weather.description)?;
        writeln!(f, "  Max Temp: {}", today.max_temp)?;
        writeln!(f, "  Min Temp: {}", today.min_temp)?;
        writeln!(f, "  Rain: {} mm", today.rain)?;

        if self.bundle.upcoming.is_empty() {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "Upcoming Days")?;
        for (index, day) in self.bundle.upcoming.iter().enumerate() {
            write_day(f, index, day, self.icon_base_url, self.expanded == Some(index))?;
        }
        Ok(())
    }
}

fn write_day(
    f: &mut fmt::Formatter<'_>,
    index: usize,
    day: &DailyForecast,
    icon_base_url: &str,
    expanded: bool,
) -> fmt::Result {
    writeln!(
        f,
        "  [{index}] {} {}  {}  {}",
        day.day_name,
        day.date,
        signed_temperature(day.temp),
        day.weather.description
    )?;
    writeln!(f, "      {}", day.weather.icon_url(icon_base_url))?;
    if expanded {
        writeln!(f, "      Max {}", day.max_temp)?;
        writeln!(f, "      Min {}", day.min_temp)?;
        writeln!(f, "      Rain {:.2} mm", day.rain)?;
    }
    Ok(())
}

/// Rendered [`SuggestionList`]
#[must_use]
pub fn render_suggestions(suggestions: &[Suggestion]) -> String {
    SuggestionList(suggestions).to_string()
}

/// Rendered [`BundleView`]
#[must_use]
pub fn render_bundle(bundle: &ForecastBundle, icon_base_url: &str, expanded: Option<usize>) -> String {
    BundleView {
        bundle,
        icon_base_url,
        expanded,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoPoint, Location, Weather};
    use rstest::rstest;

    const ICONS: &str = "https://www.weatherbit.io/static/img/icons";

    fn day(date: &str, day_name: &str, temp: f64, rain: f64) -> DailyForecast {
        DailyForecast {
            date: date.to_string(),
            day_name: day_name.to_string(),
            temp,
            min_temp: temp - 2.0,
            max_temp: temp + 2.0,
            rain,
            weather: Weather {
                description: "Light rain".to_string(),
                icon: "r01d".to_string(),
            },
        }
    }

    fn bundle() -> ForecastBundle {
        ForecastBundle {
            today: day("07.03", "Thursday", 5.5, 1.5),
            upcoming: vec![day("08.03", "Friday", -1.0, 0.123)],
            location: Location::new(
                "Berlin".to_string(),
                "DE".to_string(),
                GeoPoint::new(52.52, 13.405),
            ),
        }
    }

    #[rstest]
    #[case(5.5, "+5.5")]
    #[case(0.0, "0")]
    #[case(-3.2, "-3.2")]
    fn test_signed_temperature(#[case] temp: f64, #[case] expected: &str) {
        assert_eq!(signed_temperature(temp), expected);
    }

    #[test]
    fn test_render_suggestions() {
        let rendered = render_suggestions(&[
            Suggestion::new("abc", "Berlin, Germany"),
            Suggestion::new("def", "Bern, Switzerland"),
        ]);
        assert_eq!(rendered, "  [0] Berlin, Germany\n  [1] Bern, Switzerland\n");
    }

    #[test]
    fn test_render_today_panel() {
        let rendered = render_bundle(&bundle(), ICONS, None);
        assert!(rendered.starts_with("+5.5 Berlin\nLight rain\n"));
        assert!(rendered.contains("Max Temp: 7.5"));
        assert!(rendered.contains("Rain: 1.5 mm"));
        assert!(rendered.contains("Upcoming Days"));
        assert!(rendered.contains("[0] Friday 08.03  -1  Light rain"));
        assert!(rendered.contains("https://www.weatherbit.io/static/img/icons/r01d.png"));
        assert!(!rendered.contains("Rain 0.12 mm"));
    }

    #[test]
    fn test_render_expanded_day() {
        let rendered = render_bundle(&bundle(), ICONS, Some(0));
        assert!(rendered.contains("Max 1"));
        assert!(rendered.contains("Rain 0.12 mm"));
    }

    #[test]
    fn test_render_without_upcoming() {
        let mut single = bundle();
        single.upcoming.clear();
        let rendered = render_bundle(&single, ICONS, None);
        assert!(!rendered.contains("Upcoming Days"));
    }

    #[test]
    fn test_bundle_view_formats_inline() {
        let bundle = bundle();
        let view = BundleView {
            bundle: &bundle,
            icon_base_url: ICONS,
            expanded: Some(0),
        };
        let rendered = format!("{view}");
        assert_eq!(rendered, render_bundle(&bundle, ICONS, Some(0)));
        assert!(rendered.ends_with("      Rain 0.12 mm\n"));
    }
}
