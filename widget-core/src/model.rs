use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::condition::ConditionCategory;

/// Scale a provider reported its temperatures in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureScale {
    Celsius,
    Fahrenheit,
}

impl TemperatureScale {
    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureScale::Celsius => "°C",
            TemperatureScale::Fahrenheit => "°F",
        }
    }
}

/// Unit a provider reported its wind speed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedUnit {
    MetresPerSecond,
    KilometresPerHour,
    MilesPerHour,
}

impl SpeedUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            SpeedUnit::MetresPerSecond => "m/s",
            SpeedUnit::KilometresPerHour => "km/h",
            SpeedUnit::MilesPerHour => "mph",
        }
    }
}

/// Current conditions for one location.
///
/// Numbers are kept exactly as the provider reported them, tagged with the
/// units they came in; display derives its strings from these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city_name: String,
    pub country_code: String,
    pub observed_at: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub temperature_scale: TemperatureScale,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub wind_unit: SpeedUnit,
    pub pressure_hpa: f64,
    pub condition_main: String,
    pub condition_description: String,
    pub condition: ConditionCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A successful current-weather response, mapped and raw.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentReport {
    pub snapshot: WeatherSnapshot,
    /// Present when the provider reports them; drives the forecast request.
    pub coordinates: Option<Coordinates>,
    /// Offset of the location's wall clock from UTC, when known.
    pub utc_offset: Option<FixedOffset>,
    /// Untouched provider response, kept for the per-city cache.
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub at: DateTime<Utc>,
    pub temperature: f64,
    pub condition_main: String,
    pub condition_description: String,
    pub condition: ConditionCategory,
}

/// Multi-point forecast time series in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSeries {
    pub points: Vec<ForecastPoint>,
    pub utc_offset: FixedOffset,
    pub temperature_scale: TemperatureScale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub min_temp: f64,
    pub max_temp: f64,
    pub temperature_scale: TemperatureScale,
    pub condition_main: String,
    pub condition_description: String,
    pub condition: ConditionCategory,
}
