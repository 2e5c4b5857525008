//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use widget_core::{
    Config, CurrentView, ForecastDayView, ProviderKind, Variant, WeatherView, WidgetError,
};
use wiremock::MockServer;

pub const API_KEY: &str = "test-key";

/// Schema A current-weather body for Seoul at 2023-11-15 07:13 local time.
pub fn seoul_current() -> serde_json::Value {
    city_current("Seoul", 21.7)
}

pub fn city_current(name: &str, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": 126.9778, "lat": 37.5683 },
        "weather": [
            { "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }
        ],
        "base": "stations",
        "main": {
            "temp": temp,
            "feels_like": 20.9,
            "temp_min": 20.1,
            "temp_max": 22.3,
            "pressure": 1021,
            "humidity": 40
        },
        "visibility": 10000,
        "wind": { "speed": 2.1, "deg": 270 },
        "clouds": { "all": 0 },
        "dt": 1_700_000_000,
        "sys": { "country": "KR", "sunrise": 1_699_999_000, "sunset": 1_700_036_000 },
        "timezone": 32400,
        "id": 1_835_848,
        "name": name,
        "cod": 200
    })
}

/// Schema A forecast body: three points per UTC day over `days` days,
/// starting 2023-11-15 00:00 UTC.
pub fn forecast_body(days: i64) -> serde_json::Value {
    let start = 1_700_006_400; // 2023-11-15T00:00:00Z
    let mut list = Vec::new();
    for day in 0..days {
        for (slot, hour) in [3_i64, 9, 15].into_iter().enumerate() {
            let temp = 10.0 + day as f64 + slot as f64 * 2.0;
            list.push(serde_json::json!({
                "dt": start + day * 86_400 + hour * 3_600,
                "main": { "temp": temp, "feels_like": temp, "humidity": 50, "pressure": 1015 },
                "weather": [{ "main": "Clouds", "description": "scattered clouds" }],
                "wind": { "speed": 3.0 },
                "dt_txt": ""
            }));
        }
    }
    serde_json::json!({
        "cod": "200",
        "cnt": list.len(),
        "list": list,
        "city": { "name": "Seoul", "country": "KR", "timezone": 0 }
    })
}

/// Schema B body for Seoul.
pub fn weatherapi_current() -> serde_json::Value {
    serde_json::json!({
        "location": {
            "name": "Seoul",
            "region": "",
            "country": "South Korea",
            "lat": 37.57,
            "lon": 127.0,
            "tz_id": "Asia/Seoul",
            "localtime_epoch": 1_700_000_000,
            "localtime": "2023-11-15 7:13"
        },
        "current": {
            "last_updated_epoch": 1_700_000_000,
            "temp_c": 21.4,
            "temp_f": 70.5,
            "condition": { "text": "맑음", "code": 1000 },
            "wind_kph": 7.6,
            "pressure_mb": 1021.0,
            "humidity": 40,
            "feelslike_c": 20.6
        }
    })
}

pub fn openweather_config(server: &MockServer) -> Config {
    Config {
        api_key: API_KEY.to_string(),
        base_url: server.uri(),
        language: "en".to_string(),
        request_timeout_ms: 2_000,
        ..Config::default()
    }
}

pub fn weatherapi_config(server: &MockServer) -> Config {
    Config {
        provider: ProviderKind::WeatherApi,
        ..openweather_config(server)
    }
}

pub fn simple(config: Config) -> Config {
    Config { variant: Variant::Simple, ..config }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Loading,
    Error(WidgetError, String),
    Current(CurrentView),
    Forecast(Vec<ForecastDayView>),
}

/// View that records every call it receives.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub events: Vec<Event>,
}

impl RecordingView {
    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }
}

impl WeatherView for RecordingView {
    fn show_loading(&mut self) {
        self.events.push(Event::Loading);
    }

    fn show_error(&mut self, error: &WidgetError, message: &str) {
        self.events.push(Event::Error(error.clone(), message.to_string()));
    }

    fn render_current(&mut self, current: &CurrentView) {
        self.events.push(Event::Current(current.clone()));
    }

    fn render_forecast(&mut self, days: &[ForecastDayView]) {
        self.events.push(Event::Forecast(days.to_vec()));
    }
}

pub fn shared(config: Config) -> Arc<Config> {
    Arc::new(config)
}
