use std::{env, fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use crate::{provider::ProviderKind, settings::Settings};

/// Key shipped in templates; treated exactly like a missing key.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_OPENWEATHERMAP_API_KEY";

const PLACEHOLDER_KEYS: &[&str] = &[PLACEHOLDER_API_KEY, "YOUR_WEATHERAPI_API_KEY", "YOUR_API_KEY"];

/// Prefix accepted in front of every setting name when reading the process
/// environment. The prefixed form wins over the bare one.
pub const ENV_PREFIX: &str = "VITE_";

pub const DEFAULT_LANGUAGE: &str = "ko";
pub const DEFAULT_CITY: &str = "Seoul";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_CACHE_TTL_MS: u64 = 300_000;

/// Canonical setting names, shared by the settings file and the environment.
pub mod keys {
    pub const API_KEY: &str = "WEATHER_API_KEY";
    pub const BASE_URL: &str = "WEATHER_API_BASE_URL";
    pub const LANGUAGE: &str = "WEATHER_LANGUAGE";
    pub const UNIT: &str = "WEATHER_UNIT";
    pub const DEFAULT_CITY: &str = "WEATHER_DEFAULT_CITY";
    pub const TIMEOUT: &str = "WEATHER_API_TIMEOUT";
    pub const CACHE_DURATION: &str = "WEATHER_CACHE_DURATION";
    pub const DEBUG_MODE: &str = "WEATHER_DEBUG_MODE";
    pub const PROVIDER: &str = "WEATHER_PROVIDER";
    pub const VARIANT: &str = "WEATHER_VARIANT";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Metric,
    Imperial,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Metric => "metric",
            Unit::Imperial => "imperial",
        }
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Ok(Unit::Metric),
            "imperial" => Ok(Unit::Imperial),
            other => Err(format!("unknown unit '{other}'")),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rendition of the widget is wired up.
///
/// `Simple` shows current conditions with wind in m/s. `Rich` converts wind
/// to km/h, adds the day/night inflection and background theme, and fetches
/// the 5-day forecast when the provider has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Simple,
    #[default]
    Rich,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Simple => "simple",
            Variant::Rich => "rich",
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(Variant::Simple),
            "rich" => Ok(Variant::Rich),
            other => Err(format!("unknown variant '{other}'")),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved provider credentials and behavioural flags.
///
/// Built once at startup and handed by reference to whatever needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub language: String,
    pub unit: Unit,
    pub default_city: Option<String>,
    pub request_timeout_ms: u64,
    pub cache_ttl_ms: u64,
    pub debug: bool,
    pub provider: ProviderKind,
    pub variant: Variant,
}

impl Default for Config {
    fn default() -> Self {
        let provider = ProviderKind::OpenWeather;
        Self {
            api_key: PLACEHOLDER_API_KEY.to_string(),
            base_url: provider.default_base_url().to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            unit: Unit::Metric,
            default_city: Some(DEFAULT_CITY.to_string()),
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            debug: false,
            provider,
            variant: Variant::Rich,
        }
    }
}

impl Config {
    /// Build a configuration from a name lookup, falling back to defaults
    /// for anything absent, empty or unparseable.
    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Config::default();

        let base_url = get(keys::BASE_URL);
        let provider = match get(keys::PROVIDER) {
            Some(raw) => ProviderKind::try_from(raw.as_str()).unwrap_or_else(|err| {
                warn!(%err, "falling back to default provider");
                infer_provider(base_url.as_deref())
            }),
            None => infer_provider(base_url.as_deref()),
        };

        Self {
            api_key: get(keys::API_KEY).unwrap_or(defaults.api_key),
            base_url: base_url.unwrap_or_else(|| provider.default_base_url().to_string()),
            language: get(keys::LANGUAGE).unwrap_or(defaults.language),
            unit: parse_or(get(keys::UNIT), keys::UNIT, defaults.unit),
            default_city: get(keys::DEFAULT_CITY).or(defaults.default_city),
            request_timeout_ms: parse_or(get(keys::TIMEOUT), keys::TIMEOUT, defaults.request_timeout_ms),
            cache_ttl_ms: parse_or(
                get(keys::CACHE_DURATION),
                keys::CACHE_DURATION,
                defaults.cache_ttl_ms,
            ),
            debug: get(keys::DEBUG_MODE).is_some_and(|v| v == "true"),
            provider,
            variant: parse_or(get(keys::VARIANT), keys::VARIANT, defaults.variant),
        }
    }

    /// Resolve from the process environment, preferring `VITE_`-prefixed names.
    pub fn from_env() -> Self {
        Self::resolve(|name| {
            env::var(format!("{ENV_PREFIX}{name}"))
                .ok()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| env::var(name).ok())
        })
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::resolve(|name| settings.get(name).map(str::to_owned))
    }

    /// Read a flat wire record (`API_KEY`, `BASE_URL`, ...). Each field that
    /// is missing or has the wrong shape takes its default independently.
    pub fn from_record(record: &Value) -> Self {
        let defaults = Config::default();
        let text = |field: &str| {
            record.get(field).and_then(Value::as_str).map(str::trim).filter(|v| !v.is_empty())
        };
        let number = |field: &str| match record.get(field) {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };

        let base_url = text("BASE_URL").map(str::to_owned);
        let provider = text("PROVIDER")
            .and_then(|p| ProviderKind::try_from(p).ok())
            .unwrap_or_else(|| infer_provider(base_url.as_deref()));

        Self {
            api_key: text("API_KEY").map(str::to_owned).unwrap_or(defaults.api_key),
            base_url: base_url.unwrap_or_else(|| provider.default_base_url().to_string()),
            language: text("LANGUAGE").map(str::to_owned).unwrap_or(defaults.language),
            unit: text("UNIT").and_then(|u| u.parse().ok()).unwrap_or(defaults.unit),
            default_city: match record.get("DEFAULT_CITY") {
                Some(Value::Null) => None,
                _ => text("DEFAULT_CITY").map(str::to_owned).or(defaults.default_city),
            },
            request_timeout_ms: number("API_TIMEOUT").unwrap_or(defaults.request_timeout_ms),
            cache_ttl_ms: number("CACHE_DURATION").unwrap_or(defaults.cache_ttl_ms),
            debug: match record.get("DEBUG_MODE") {
                Some(Value::Bool(b)) => *b,
                Some(Value::String(s)) => s == "true",
                _ => defaults.debug,
            },
            provider,
            variant: text("VARIANT").and_then(|v| v.parse().ok()).unwrap_or(defaults.variant),
        }
    }

    /// The flat wire record served by `/api/config` and injected into pages.
    pub fn to_record(&self) -> Value {
        json!({
            "API_KEY": self.api_key,
            "BASE_URL": self.base_url,
            "LANGUAGE": self.language,
            "UNIT": self.unit,
            "DEFAULT_CITY": self.default_city,
            "API_TIMEOUT": self.request_timeout_ms,
            "CACHE_DURATION": self.cache_ttl_ms,
            "DEBUG_MODE": self.debug,
            "PROVIDER": self.provider.as_str(),
            "VARIANT": self.variant,
        })
    }

    /// False when the key is empty or still one of the template placeholders.
    pub fn has_api_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && !PLACEHOLDER_KEYS.contains(&key)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

fn infer_provider(base_url: Option<&str>) -> ProviderKind {
    match base_url {
        Some(url) if url.contains("weatherapi.com") => ProviderKind::WeatherApi,
        _ => ProviderKind::OpenWeather,
    }
}

fn parse_or<T>(raw: Option<String>, name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|err| {
            warn!(setting = name, value = %raw, %err, "ignoring invalid setting");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_lookup_yields_defaults() {
        let cfg = Config::resolve(|_| None);
        assert_eq!(cfg, Config::default());
        assert!(!cfg.has_api_key());
        assert_eq!(cfg.base_url, "https://api.openweathermap.org/data/2.5");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn resolves_every_field() {
        let cfg = Config::resolve(lookup(&[
            (keys::API_KEY, "secret"),
            (keys::BASE_URL, "https://weather.test/v1"),
            (keys::LANGUAGE, "en"),
            (keys::UNIT, "imperial"),
            (keys::DEFAULT_CITY, "Busan"),
            (keys::TIMEOUT, "2500"),
            (keys::CACHE_DURATION, "60000"),
            (keys::DEBUG_MODE, "true"),
            (keys::VARIANT, "simple"),
        ]));

        assert!(cfg.has_api_key());
        assert_eq!(cfg.base_url, "https://weather.test/v1");
        assert_eq!(cfg.language, "en");
        assert_eq!(cfg.unit, Unit::Imperial);
        assert_eq!(cfg.default_city.as_deref(), Some("Busan"));
        assert_eq!(cfg.request_timeout_ms, 2500);
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(60));
        assert!(cfg.debug);
        assert_eq!(cfg.variant, Variant::Simple);
        assert_eq!(cfg.provider, ProviderKind::OpenWeather);
    }

    #[test]
    fn empty_values_count_as_absent() {
        let cfg = Config::resolve(lookup(&[(keys::API_KEY, "   "), (keys::LANGUAGE, "")]));
        assert_eq!(cfg.api_key, PLACEHOLDER_API_KEY);
        assert_eq!(cfg.language, DEFAULT_LANGUAGE);
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let cfg = Config::resolve(lookup(&[(keys::TIMEOUT, "soon"), (keys::UNIT, "kelvin")]));
        assert_eq!(cfg.request_timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(cfg.unit, Unit::Metric);
    }

    #[test]
    fn debug_mode_only_for_literal_true() {
        for raw in ["TRUE", "1", "yes"] {
            let cfg = Config::resolve(lookup(&[(keys::DEBUG_MODE, raw)]));
            assert!(!cfg.debug, "{raw} must not enable debug mode");
        }
    }

    #[test]
    fn provider_inferred_from_base_url() {
        let cfg = Config::resolve(lookup(&[(keys::BASE_URL, "http://api.weatherapi.com/v1")]));
        assert_eq!(cfg.provider, ProviderKind::WeatherApi);

        let cfg = Config::resolve(lookup(&[(keys::PROVIDER, "weatherapi")]));
        assert_eq!(cfg.base_url, "https://api.weatherapi.com/v1");
    }

    #[test]
    fn placeholder_keys_are_not_usable() {
        for key in PLACEHOLDER_KEYS {
            let cfg = Config { api_key: key.to_string(), ..Config::default() };
            assert!(!cfg.has_api_key());
        }
        let cfg = Config { api_key: String::new(), ..Config::default() };
        assert!(!cfg.has_api_key());
    }

    #[test]
    fn prefixed_environment_names_win() {
        // The only test in this binary that touches the process environment.
        unsafe {
            env::set_var("VITE_WEATHER_LANGUAGE", "en");
            env::set_var("WEATHER_LANGUAGE", "ja");
            env::set_var("VITE_WEATHER_UNIT", "");
            env::set_var("WEATHER_UNIT", "imperial");
        }
        let cfg = Config::from_env();
        unsafe {
            for name in ["VITE_WEATHER_LANGUAGE", "WEATHER_LANGUAGE", "VITE_WEATHER_UNIT", "WEATHER_UNIT"] {
                env::remove_var(name);
            }
        }

        assert_eq!(cfg.language, "en");
        assert_eq!(cfg.unit, Unit::Imperial);
    }

    #[test]
    fn settings_file_uses_bare_names() {
        let settings = Settings::parse("WEATHER_API_KEY=from-file\nWEATHER_UNIT=imperial\n");
        let cfg = Config::from_settings(&settings);
        assert_eq!(cfg.api_key, "from-file");
        assert_eq!(cfg.unit, Unit::Imperial);
    }

    #[test]
    fn record_fields_default_independently() {
        let record = json!({
            "API_KEY": "abc",
            "UNIT": 42,
            "API_TIMEOUT": "1500",
            "CACHE_DURATION": "never",
            "DEBUG_MODE": true,
        });

        let cfg = Config::from_record(&record);
        assert_eq!(cfg.api_key, "abc");
        assert_eq!(cfg.unit, Unit::Metric);
        assert_eq!(cfg.request_timeout_ms, 1500);
        assert_eq!(cfg.cache_ttl_ms, DEFAULT_CACHE_TTL_MS);
        assert!(cfg.debug);
        assert_eq!(cfg.language, DEFAULT_LANGUAGE);
    }

    #[test]
    fn record_uses_wire_field_names() {
        let cfg = Config { api_key: "k".into(), default_city: None, ..Config::default() };
        let record = cfg.to_record();

        assert_eq!(record["API_KEY"], "k");
        assert_eq!(record["UNIT"], "metric");
        assert_eq!(record["API_TIMEOUT"], 10_000);
        assert_eq!(record["DEBUG_MODE"], false);
        assert!(record["DEFAULT_CITY"].is_null());
        assert_eq!(Config::from_record(&record), cfg);
    }
}
