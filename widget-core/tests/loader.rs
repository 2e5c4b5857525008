//! Pull-mode configuration loading against a mock config endpoint.

use std::time::Duration;

use widget_core::{Config, ConfigLoader, Unit, loader::CONFIG_ENDPOINT};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

async fn load_from(server: &MockServer) -> Config {
    ConfigLoader::pull(format!("{}{CONFIG_ENDPOINT}", server.uri()))
        .load(&reqwest::Client::new())
        .await
}

#[tokio::test]
async fn pull_reads_the_served_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONFIG_ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "API_KEY": "served-key",
            "BASE_URL": "https://api.openweathermap.org/data/2.5",
            "LANGUAGE": "en",
            "UNIT": "imperial",
            "DEFAULT_CITY": "Busan",
            "API_TIMEOUT": 5000,
            "CACHE_DURATION": 60000,
            "DEBUG_MODE": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = load_from(&server).await;

    assert!(config.has_api_key());
    assert_eq!(config.api_key, "served-key");
    assert_eq!(config.unit, Unit::Imperial);
    assert_eq!(config.default_city.as_deref(), Some("Busan"));
    assert_eq!(config.request_timeout(), Duration::from_secs(5));
}

#[tokio::test]
async fn pull_falls_back_to_defaults_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONFIG_ENDPOINT))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = load_from(&server).await;

    assert_eq!(config, Config::default());
    assert!(!config.has_api_key());
}

#[tokio::test]
async fn pull_falls_back_to_defaults_on_bad_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONFIG_ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_string("window.APP_CONFIG = {}"))
        .mount(&server)
        .await;

    assert_eq!(load_from(&server).await, Config::default());
}

#[tokio::test]
async fn pull_falls_back_to_defaults_when_unreachable() {
    let config = ConfigLoader::pull("http://127.0.0.1:9/api/config")
        .load(&reqwest::Client::new())
        .await;

    assert!(!config.has_api_key());
}
