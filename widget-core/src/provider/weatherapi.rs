use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    WidgetError,
    condition::ConditionCategory,
    model::{Coordinates, CurrentReport, SpeedUnit, TemperatureScale, WeatherSnapshot},
};

use super::{Endpoint, ProviderKind, WeatherProvider, get_json};

/// WeatherAPI.com `current.json` (schema B). Always reports Celsius and km/h.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    endpoint: Endpoint,
}

impl WeatherApiProvider {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    fn classify(status: StatusCode) -> Option<WidgetError> {
        match status {
            StatusCode::BAD_REQUEST => Some(WidgetError::NotFound),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Some(WidgetError::Unauthorized),
            _ => None,
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::WeatherApi
    }

    #[instrument(skip(self), fields(provider = "weatherapi"))]
    async fn fetch_current(&self, city: &str) -> Result<CurrentReport, WidgetError> {
        let ep = &self.endpoint;
        let url = ep.url(
            "current.json",
            &[
                ("key", ep.api_key.as_str()),
                ("q", city),
                ("lang", ep.language.as_str()),
                ("aqi", "no"),
            ],
        )?;

        let raw = get_json(ep.get(url), Self::classify).await?;
        let parsed: WaResponse = serde_json::from_value(raw.clone())
            .map_err(|e| WidgetError::Network(format!("unexpected WeatherAPI response: {e}")))?;

        let utc_offset = parsed.location.utc_offset();
        let coordinates = match (parsed.location.lat, parsed.location.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
            _ => None,
        };

        let ts = parsed.current.last_updated_epoch.or(parsed.location.localtime_epoch);
        let observed_at = ts.and_then(|ts| DateTime::from_timestamp(ts, 0)).unwrap_or_else(Utc::now);

        let condition = ConditionCategory::from_weatherapi(
            parsed.current.condition.code,
            &parsed.current.condition.text,
        );

        let snapshot = WeatherSnapshot {
            city_name: parsed.location.name,
            country_code: parsed.location.country,
            observed_at,
            temperature: parsed.current.temp_c,
            feels_like: parsed.current.feelslike_c,
            temperature_scale: TemperatureScale::Celsius,
            humidity_pct: parsed.current.humidity,
            wind_speed: parsed.current.wind_kph,
            wind_unit: SpeedUnit::KilometresPerHour,
            pressure_hpa: parsed.current.pressure_mb,
            condition_main: parsed.current.condition.text.clone(),
            condition_description: parsed.current.condition.text,
            condition,
        };
        debug!(city = %snapshot.city_name, temp = snapshot.temperature, "current weather mapped");

        Ok(CurrentReport { snapshot, coordinates, utc_offset, raw })
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    #[serde(default)]
    country: String,
    lat: Option<f64>,
    lon: Option<f64>,
    localtime_epoch: Option<i64>,
    /// Wall-clock time at the location, `YYYY-MM-DD H:MM`.
    localtime: Option<String>,
}

impl WaLocation {
    /// Derive the location's UTC offset from its wall clock and epoch,
    /// rounded to the nearest quarter hour.
    fn utc_offset(&self) -> Option<FixedOffset> {
        let epoch = DateTime::from_timestamp(self.localtime_epoch?, 0)?.naive_utc();
        let local = NaiveDateTime::parse_from_str(self.localtime.as_deref()?, "%Y-%m-%d %H:%M").ok()?;

        let secs = (local - epoch).num_seconds();
        let quarter = 15 * 60;
        let rounded = (secs as f64 / quarter as f64).round() as i32 * quarter;
        FixedOffset::east_opt(rounded)
    }
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    code: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    humidity: u8,
    wind_kph: f64,
    pressure_mb: f64,
    condition: WaCondition,
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}
