//! Rendering surface seen by the search flow.
//!
//! The flow never touches a concrete UI; it calls a [`WeatherView`] with
//! display-ready values built here.

use chrono::{FixedOffset, Local, Offset, Timelike};

use crate::{
    Config, Variant, WidgetError,
    condition::{BackgroundTheme, TimeOfDay},
    model::{CurrentReport, ForecastDay, SpeedUnit},
};

/// Capabilities the widget needs from whatever draws it.
pub trait WeatherView: Send {
    /// Show the spinner and clear any previous error.
    fn show_loading(&mut self);

    /// Leave the loading state and show `message` over the placeholder.
    fn show_error(&mut self, error: &WidgetError, message: &str);

    /// Replace the displayed snapshot. Resets the forecast section.
    fn render_current(&mut self, current: &CurrentView);

    fn render_forecast(&mut self, days: &[ForecastDayView]);
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentView {
    /// `"{city}, {country}"`.
    pub location: String,
    pub observed_at: String,
    pub icon: &'static str,
    /// Rounded temperature without unit, e.g. `"22"`.
    pub temperature: String,
    pub temperature_unit: &'static str,
    pub description: String,
    pub feels_like: String,
    pub humidity: String,
    pub wind: String,
    pub pressure: String,
    /// Only set for the rich variant.
    pub theme: Option<BackgroundTheme>,
}

impl CurrentView {
    pub fn build(report: &CurrentReport, config: &Config) -> Self {
        let snapshot = &report.snapshot;
        let offset = report.utc_offset.unwrap_or_else(local_offset);
        let local = snapshot.observed_at.with_timezone(&offset);

        let time_of_day = match config.variant {
            Variant::Rich => TimeOfDay::from_hour(local.hour()),
            Variant::Simple => TimeOfDay::Day,
        };
        let theme = match config.variant {
            Variant::Rich => Some(BackgroundTheme::select(snapshot.condition, time_of_day)),
            Variant::Simple => None,
        };

        let location = if snapshot.country_code.is_empty() {
            snapshot.city_name.clone()
        } else {
            format!("{}, {}", snapshot.city_name, snapshot.country_code)
        };

        Self {
            location,
            observed_at: local.format("%A, %B %-d, %Y %H:%M").to_string(),
            icon: snapshot.condition.glyph(time_of_day),
            temperature: round_half_up(snapshot.temperature).to_string(),
            temperature_unit: snapshot.temperature_scale.symbol(),
            description: capitalize(&snapshot.condition_description),
            feels_like: format!(
                "{}{}",
                round_half_up(snapshot.feels_like),
                snapshot.temperature_scale.symbol()
            ),
            humidity: format!("{}%", snapshot.humidity_pct),
            wind: wind(snapshot.wind_speed, snapshot.wind_unit, config.variant),
            pressure: format!("{} hPa", round_half_up(snapshot.pressure_hpa)),
            theme,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDayView {
    /// e.g. `"Mon 03/04"`.
    pub label: String,
    pub icon: &'static str,
    pub min: String,
    pub max: String,
    pub description: String,
}

impl ForecastDayView {
    pub fn build(day: &ForecastDay) -> Self {
        let unit = day.temperature_scale.symbol();
        Self {
            label: day.date.format("%a %m/%d").to_string(),
            icon: day.condition.glyph(TimeOfDay::Day),
            min: format!("{}{unit}", round_half_up(day.min_temp)),
            max: format!("{}{unit}", round_half_up(day.max_temp)),
            description: capitalize(&day.condition_description),
        }
    }
}

/// The rich widget shows metres per second as km/h; every other speed is
/// shown in the unit the provider reported it in.
fn wind(speed: f64, unit: SpeedUnit, variant: Variant) -> String {
    match (variant, unit) {
        (Variant::Rich, SpeedUnit::MetresPerSecond) => {
            format!("{} {}", one_decimal(speed * 3.6), SpeedUnit::KilometresPerHour.symbol())
        }
        _ => format!("{} {}", one_decimal(speed), unit.symbol()),
    }
}

/// Halves round towards positive infinity, so `-2.5` becomes `-2`.
fn round_half_up(value: f64) -> i64 {
    let nearest = value.round();
    let rounded = if (nearest - value).abs() == 0.5 { value.ceil() } else { nearest };
    rounded as i64
}

/// One decimal place with exact halves rounded away from zero.
///
/// `{:.1}` already rounds the exact binary value correctly; it only differs
/// on true ties, which it sends to the even digit. The only binary values
/// that sit exactly halfway at one decimal are odd multiples of `0.25`.
fn one_decimal(value: f64) -> String {
    let quarters = value * 4.0;
    let is_tie = quarters.fract() == 0.0 && quarters % 2.0 != 0.0;
    if is_tie {
        format!("{:.1}", (value * 10.0).round() / 10.0)
    } else {
        format!("{value:.1}")
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        condition::ConditionCategory,
        model::{TemperatureScale, WeatherSnapshot},
    };
    use chrono::{DateTime, NaiveDate};
    use serde_json::json;

    fn report(temp: f64, wind: f64, main: &str, offset_secs: i32) -> CurrentReport {
        CurrentReport {
            snapshot: WeatherSnapshot {
                city_name: "Seoul".into(),
                country_code: "KR".into(),
                observed_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
                temperature: temp,
                feels_like: temp - 1.0,
                temperature_scale: TemperatureScale::Celsius,
                humidity_pct: 40,
                wind_speed: wind,
                wind_unit: SpeedUnit::MetresPerSecond,
                pressure_hpa: 1021.0,
                condition_main: main.into(),
                condition_description: "clear sky".into(),
                condition: ConditionCategory::from_openweather_main(main),
            },
            coordinates: None,
            utc_offset: FixedOffset::east_opt(offset_secs),
            raw: json!({}),
        }
    }

    fn simple() -> Config {
        Config { variant: Variant::Simple, ..Config::default() }
    }

    #[test]
    fn rich_variant_converts_wind_to_kmh() {
        let view = CurrentView::build(&report(21.7, 2.1, "Clear", 9 * 3600), &Config::default());

        assert_eq!(view.location, "Seoul, KR");
        assert_eq!(view.temperature, "22");
        assert_eq!(view.feels_like, "21°C");
        assert_eq!(view.wind, "7.6 km/h");
        assert_eq!(view.pressure, "1021 hPa");
        assert_eq!(view.humidity, "40%");
        assert_eq!(view.description, "Clear sky");
        assert_eq!(view.icon, "☀️");
        assert_eq!(view.theme, Some(BackgroundTheme::ClearDay));
        assert_eq!(view.observed_at, "Wednesday, November 15, 2023 07:13");
    }

    #[test]
    fn simple_variant_keeps_metres_per_second() {
        let view = CurrentView::build(&report(21.7, 2.1, "Clear", 0), &simple());

        assert_eq!(view.wind, "2.1 m/s");
        assert_eq!(view.icon, "☀️");
        assert_eq!(view.theme, None);
    }

    #[test]
    fn clear_night_uses_moon_and_night_theme() {
        // 22:13 UTC.
        let view = CurrentView::build(&report(5.0, 0.0, "Clear", 0), &Config::default());
        assert_eq!(view.icon, "🌙");
        assert_eq!(view.theme, Some(BackgroundTheme::ClearNight));
    }

    #[test]
    fn reported_units_are_displayed_without_conversion() {
        let mut fahrenheit = report(70.5, 11.25, "Clouds", 0);
        fahrenheit.snapshot.temperature_scale = TemperatureScale::Fahrenheit;
        fahrenheit.snapshot.wind_unit = SpeedUnit::MilesPerHour;

        let view = CurrentView::build(&fahrenheit, &Config::default());
        assert_eq!(view.temperature, "71");
        assert_eq!(view.temperature_unit, "°F");
        assert_eq!(view.feels_like, "70°F");
        assert_eq!(view.wind, "11.3 mph");

        let mut kph = report(21.4, 7.6, "Clear", 0);
        kph.snapshot.wind_unit = SpeedUnit::KilometresPerHour;
        assert_eq!(CurrentView::build(&kph, &Config::default()).wind, "7.6 km/h");
        assert_eq!(CurrentView::build(&kph, &simple()).wind, "7.6 km/h");
    }

    #[test]
    fn wind_ties_round_away_from_zero() {
        for (speed, expected) in [(0.25, "0.3 m/s"), (1.25, "1.3 m/s"), (2.75, "2.8 m/s"), (0.05, "0.1 m/s")] {
            let view = CurrentView::build(&report(20.0, speed, "Clear", 0), &simple());
            assert_eq!(view.wind, expected, "{speed}");
        }
        assert_eq!(one_decimal(-0.25), "-0.3");
        assert_eq!(one_decimal(2.35), "2.4");
        assert_eq!(one_decimal(0.15), "0.1");
        assert_eq!(one_decimal(7.5600000000000005), "7.6");
    }

    #[test]
    fn rounding_matches_half_up() {
        assert_eq!(round_half_up(21.5), 22);
        assert_eq!(round_half_up(21.4), 21);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
        assert_eq!(round_half_up(-0.4), 0);
        assert_eq!(round_half_up(0.499_999_999_999_999_94), 0);
    }

    #[test]
    fn forecast_day_labels() {
        let day = ForecastDay {
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            min_temp: -1.4,
            max_temp: 8.6,
            temperature_scale: TemperatureScale::Celsius,
            condition_main: "Snow".into(),
            condition_description: "light snow".into(),
            condition: ConditionCategory::Snowy,
        };
        let view = ForecastDayView::build(&day);

        assert_eq!(view.label, "Mon 03/04");
        assert_eq!(view.min, "-1°C");
        assert_eq!(view.max, "9°C");
        assert_eq!(view.icon, "❄️");
        assert_eq!(view.description, "Light snow");
    }
}
