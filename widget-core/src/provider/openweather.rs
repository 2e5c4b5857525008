use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    Unit, WidgetError,
    condition::ConditionCategory,
    model::{
        Coordinates, CurrentReport, ForecastPoint, ForecastSeries, SpeedUnit, TemperatureScale,
        WeatherSnapshot,
    },
};

use super::{Endpoint, ProviderKind, WeatherProvider, get_json};

/// OpenWeatherMap `/weather` and `/forecast` (schema A).
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    endpoint: Endpoint,
}

impl OpenWeatherProvider {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    fn classify(status: StatusCode) -> Option<WidgetError> {
        match status {
            StatusCode::NOT_FOUND => Some(WidgetError::NotFound),
            StatusCode::UNAUTHORIZED => Some(WidgetError::Unauthorized),
            _ => None,
        }
    }

    /// `units=imperial` switches temperatures to Fahrenheit and wind to mph.
    fn scale(&self) -> TemperatureScale {
        match self.endpoint.unit {
            Unit::Metric => TemperatureScale::Celsius,
            Unit::Imperial => TemperatureScale::Fahrenheit,
        }
    }

    fn wind_unit(&self) -> SpeedUnit {
        match self.endpoint.unit {
            Unit::Metric => SpeedUnit::MetresPerSecond,
            Unit::Imperial => SpeedUnit::MilesPerHour,
        }
    }

    fn map_current(&self, parsed: OwCurrentResponse) -> WeatherSnapshot {
        let (condition_main, condition_description) = first_condition(&parsed.weather);

        WeatherSnapshot {
            city_name: parsed.name,
            country_code: parsed.sys.country.unwrap_or_default(),
            observed_at: unix_to_utc(parsed.dt).unwrap_or_else(Utc::now),
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            temperature_scale: self.scale(),
            humidity_pct: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            wind_unit: self.wind_unit(),
            pressure_hpa: parsed.main.pressure,
            condition: ConditionCategory::from_openweather_main(&condition_main),
            condition_main,
            condition_description,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenWeather
    }

    #[instrument(skip(self), fields(provider = "openweather"))]
    async fn fetch_current(&self, city: &str) -> Result<CurrentReport, WidgetError> {
        let ep = &self.endpoint;
        let url = ep.url(
            "weather",
            &[
                ("q", city),
                ("appid", ep.api_key.as_str()),
                ("units", ep.unit.as_str()),
                ("lang", ep.language.as_str()),
            ],
        )?;

        let raw = get_json(ep.get(url), Self::classify).await?;
        let parsed: OwCurrentResponse = serde_json::from_value(raw.clone())
            .map_err(|e| WidgetError::Network(format!("unexpected OpenWeather response: {e}")))?;

        let coordinates = parsed.coord.as_ref().map(|c| Coordinates { lat: c.lat, lon: c.lon });
        let utc_offset = parsed.timezone.and_then(FixedOffset::east_opt);
        let snapshot = self.map_current(parsed);
        debug!(city = %snapshot.city_name, temp = snapshot.temperature, "current weather mapped");

        Ok(CurrentReport { snapshot, coordinates, utc_offset, raw })
    }

    #[instrument(skip(self), fields(provider = "openweather"))]
    async fn fetch_forecast(&self, at: Coordinates) -> Result<ForecastSeries, WidgetError> {
        let ep = &self.endpoint;
        let (lat, lon) = (at.lat.to_string(), at.lon.to_string());
        let url = ep.url(
            "forecast",
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", ep.api_key.as_str()),
                ("units", ep.unit.as_str()),
                ("lang", ep.language.as_str()),
            ],
        )?;

        let raw = get_json(ep.get(url), Self::classify).await?;
        let parsed: OwForecastResponse = serde_json::from_value(raw)
            .map_err(|e| WidgetError::Network(format!("unexpected OpenWeather forecast: {e}")))?;

        let utc_offset = parsed
            .city
            .and_then(|c| c.timezone)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());

        let points = parsed
            .list
            .into_iter()
            .filter_map(|entry| {
                let at = unix_to_utc(entry.dt)?;
                let (condition_main, condition_description) = first_condition(&entry.weather);
                Some(ForecastPoint {
                    at,
                    temperature: entry.main.temp,
                    condition: ConditionCategory::from_openweather_main(&condition_main),
                    condition_main,
                    condition_description,
                })
            })
            .collect();

        Ok(ForecastSeries { points, utc_offset, temperature_scale: self.scale() })
    }

    fn supports_forecast(&self) -> bool {
        true
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    sys: OwSys,
    coord: Option<OwCoord>,
    /// Shift in seconds from UTC.
    timezone: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    timezone: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: Option<OwCity>,
    list: Vec<OwForecastEntry>,
}

fn first_condition(weather: &[OwWeather]) -> (String, String) {
    weather
        .first()
        .map(|w| (w.main.clone(), w.description.clone()))
        .unwrap_or_else(|| ("Unknown".to_string(), String::new()))
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}
