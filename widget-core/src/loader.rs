//! The two ways configuration reaches the widget: fetched from the config
//! endpoint (pull) or injected into the served page (push).

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::Config;

/// Global slot the push-mode server assigns the serialized config to.
pub const INJECTED_GLOBAL: &str = "window.APP_CONFIG";

/// Default path of the pull-mode endpoint.
pub const CONFIG_ENDPOINT: &str = "/api/config";

#[derive(Debug, Clone)]
pub enum ConfigLoader {
    /// `GET` the flat config record from `endpoint`.
    Pull { endpoint: String, timeout: Duration },
    /// A record literal already present in the page.
    Push { injected: Option<String> },
}

impl ConfigLoader {
    pub fn pull(endpoint: impl Into<String>) -> Self {
        ConfigLoader::Pull {
            endpoint: endpoint.into(),
            timeout: Duration::from_millis(crate::config::DEFAULT_TIMEOUT_MS),
        }
    }

    /// Read the literal injected into a served page.
    pub fn from_page(html: &str) -> Self {
        ConfigLoader::Push { injected: extract_injected(html).map(str::to_owned) }
    }

    /// Resolve the configuration. Never fails: any problem is logged and
    /// the built-in defaults (with a placeholder key) are used.
    pub async fn load(&self, http: &reqwest::Client) -> Config {
        match self {
            ConfigLoader::Pull { endpoint, timeout } => {
                match fetch_record(http, endpoint, *timeout).await {
                    Ok(record) => {
                        info!(endpoint = %endpoint, "configuration loaded");
                        Config::from_record(&record)
                    }
                    Err(err) => {
                        warn!(endpoint = %endpoint, error = %err, "failed to load configuration, using defaults");
                        Config::default()
                    }
                }
            }
            ConfigLoader::Push { injected: Some(literal) } => {
                match serde_json::from_str::<Value>(literal) {
                    Ok(record) => Config::from_record(&record),
                    Err(err) => {
                        warn!(error = %err, "injected configuration is not valid JSON, using defaults");
                        Config::default()
                    }
                }
            }
            ConfigLoader::Push { injected: None } => {
                warn!("no injected configuration found, using defaults");
                Config::default()
            }
        }
    }
}

async fn fetch_record(
    http: &reqwest::Client,
    endpoint: &str,
    timeout: Duration,
) -> Result<Value, reqwest::Error> {
    http.get(endpoint).timeout(timeout).send().await?.error_for_status()?.json().await
}

/// Insert a script assigning `config` to [`INJECTED_GLOBAL`] immediately
/// before the first `<script` tag. Documents without one come back unchanged.
pub fn inject_config(html: &str, config: &Config) -> String {
    let Some(idx) = html.to_ascii_lowercase().find("<script") else {
        debug!("no script tag found, page served without injected configuration");
        return html.to_string();
    };

    // `</` inside a string literal would close the script element early.
    let literal = config.to_record().to_string().replace("</", "<\\/");
    let snippet = format!("<script>{INJECTED_GLOBAL} = {literal};</script>\n");

    let mut out = String::with_capacity(html.len() + snippet.len());
    out.push_str(&html[..idx]);
    out.push_str(&snippet);
    out.push_str(&html[idx..]);
    out
}

/// The JSON literal assigned to [`INJECTED_GLOBAL`], if the page has one.
pub fn extract_injected(html: &str) -> Option<&str> {
    let start = html.find(INJECTED_GLOBAL)? + INJECTED_GLOBAL.len();
    let rest = html[start..].trim_start().strip_prefix('=')?.trim_start();

    let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
    stream.next()?.ok()?;
    Some(&rest[..stream.byte_offset()])
}
