use crate::{
    Config, WidgetError,
    model::{Coordinates, CurrentReport, ForecastSeries},
    provider::{openweather::OpenWeatherProvider, weatherapi::WeatherApiProvider},
};
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde_json::Value;
use std::{convert::TryFrom, fmt::Debug, time::Duration};
use tracing::debug;

pub mod openweather;
pub mod weatherapi;

/// Upstream response schema the widget is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// OpenWeatherMap: current weather and 5-day/3-hour forecast.
    OpenWeather,
    /// WeatherAPI.com: current weather only.
    WeatherApi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenWeather => "openweather",
            ProviderKind::WeatherApi => "weatherapi",
        }
    }

    pub const fn all() -> &'static [ProviderKind] {
        &[ProviderKind::OpenWeather, ProviderKind::WeatherApi]
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenWeather => "https://api.openweathermap.org/data/2.5",
            ProviderKind::WeatherApi => "https://api.weatherapi.com/v1",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderKind {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" | "openweathermap" => Ok(ProviderKind::OpenWeather),
            "weatherapi" => Ok(ProviderKind::WeatherApi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, weatherapi."
            )),
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn kind(&self) -> ProviderKind;

    async fn fetch_current(&self, city: &str) -> Result<CurrentReport, WidgetError>;

    async fn fetch_forecast(&self, _at: Coordinates) -> Result<ForecastSeries, WidgetError> {
        Err(WidgetError::ForecastUnsupported(self.kind().as_str()))
    }

    fn supports_forecast(&self) -> bool {
        false
    }
}

/// The provider selected at configuration time.
#[derive(Debug, Clone)]
pub enum Provider {
    OpenWeather(OpenWeatherProvider),
    WeatherApi(WeatherApiProvider),
}

impl Provider {
    /// Construct the provider named by `config.provider`.
    ///
    /// A missing key is not rejected here; the search flow checks
    /// [`Config::has_api_key`] before any request.
    pub fn from_config(config: &Config) -> Self {
        let endpoint = Endpoint::from_config(config);
        match config.provider {
            ProviderKind::OpenWeather => Provider::OpenWeather(OpenWeatherProvider::new(endpoint)),
            ProviderKind::WeatherApi => Provider::WeatherApi(WeatherApiProvider::new(endpoint)),
        }
    }
}

#[async_trait]
impl WeatherProvider for Provider {
    fn kind(&self) -> ProviderKind {
        match self {
            Provider::OpenWeather(p) => p.kind(),
            Provider::WeatherApi(p) => p.kind(),
        }
    }

    async fn fetch_current(&self, city: &str) -> Result<CurrentReport, WidgetError> {
        match self {
            Provider::OpenWeather(p) => p.fetch_current(city).await,
            Provider::WeatherApi(p) => p.fetch_current(city).await,
        }
    }

    async fn fetch_forecast(&self, at: Coordinates) -> Result<ForecastSeries, WidgetError> {
        match self {
            Provider::OpenWeather(p) => p.fetch_forecast(at).await,
            Provider::WeatherApi(p) => p.fetch_forecast(at).await,
        }
    }

    fn supports_forecast(&self) -> bool {
        match self {
            Provider::OpenWeather(p) => p.supports_forecast(),
            Provider::WeatherApi(p) => p.supports_forecast(),
        }
    }
}

/// Connection parameters shared by both schemas.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub base_url: String,
    pub api_key: String,
    pub language: String,
    pub unit: crate::Unit,
    pub timeout: Duration,
    http: reqwest::Client,
}

impl Endpoint {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            unit: config.unit,
            timeout: config.request_timeout(),
            http: reqwest::Client::new(),
        }
    }

    /// `{base_url}/{path}` with `params` percent-encoded into the query.
    pub(crate) fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, WidgetError> {
        Url::parse_with_params(&format!("{}/{}", self.base_url, path), params)
            .map_err(|e| WidgetError::Network(format!("invalid request URL: {e}")))
    }

    pub(crate) fn get(&self, url: Url) -> RequestBuilder {
        self.http.get(url).timeout(self.timeout)
    }
}

/// Send `request` and return the decoded JSON body.
///
/// `classify` maps provider-specific statuses to error categories; anything
/// it leaves unmapped becomes [`WidgetError::Network`].
pub(crate) async fn get_json(
    request: RequestBuilder,
    classify: fn(StatusCode) -> Option<WidgetError>,
) -> Result<Value, WidgetError> {
    let res = request.send().await.map_err(WidgetError::from_reqwest)?;

    let status = res.status();
    let body = res.text().await.map_err(WidgetError::from_reqwest)?;

    if !status.is_success() {
        debug!(%status, body = %truncate_body(&body), "provider returned an error status");
        return Err(classify(status)
            .unwrap_or_else(|| WidgetError::Network(format!("provider returned status {status}"))));
    }

    serde_json::from_str(&body)
        .map_err(|e| WidgetError::Network(format!("failed to parse provider JSON: {e}")))
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_as_str_roundtrip() {
        for kind in ProviderKind::all() {
            let s = kind.as_str();
            let parsed = ProviderKind::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderKind::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn provider_follows_config_selection() {
        let cfg = Config { provider: ProviderKind::WeatherApi, ..Config::default() };
        let provider = Provider::from_config(&cfg);
        assert_eq!(provider.kind(), ProviderKind::WeatherApi);
        assert!(!provider.supports_forecast());

        let provider = Provider::from_config(&Config::default());
        assert_eq!(provider.kind(), ProviderKind::OpenWeather);
        assert!(provider.supports_forecast());
    }

    #[test]
    fn city_is_percent_encoded_into_query() {
        let cfg = Config {
            base_url: "https://weather.test/data/2.5/".into(),
            ..Config::default()
        };
        let endpoint = Endpoint::from_config(&cfg);
        let url = endpoint.url("weather", &[("q", "São Paulo&x=1")]).unwrap();

        assert_eq!(url.path(), "/data/2.5/weather");
        assert_eq!(url.query(), Some("q=S%C3%A3o+Paulo%26x%3D1"));
        let q: Vec<_> = url.query_pairs().collect();
        assert_eq!(q[0].1, "São Paulo&x=1");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let long = "날".repeat(300);
        assert_eq!(truncate_body(&long).chars().count(), 200);
        assert_eq!(truncate_body("short"), "short");
    }
}
