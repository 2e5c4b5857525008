use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{Password, Select, Text};
use tracing::{debug, info, warn};
use widget_core::{
    CacheStore, Config, ConfigLoader, FileCache, Provider, ProviderKind, SearchOutcome, Settings,
    SettingsError, Unit, Variant, Widget,
    config::{DEFAULT_CITY, DEFAULT_LANGUAGE, keys},
    settings::DEFAULT_SETTINGS_FILE,
};

use crate::{
    server::{self, Mode, ServerState},
    terminal::TerminalView,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-widget", version, about = "Weather lookup widget")]
pub struct Cli {
    /// Verbose logging (same as `WEATHER_DEBUG_MODE=true`).
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the widget page and its configuration.
    Serve {
        /// Directory holding `index.html` and its assets.
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Settings file injected into pages in push mode.
        #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
        settings: PathBuf,

        #[arg(long, short, default_value_t = 8000)]
        port: u16,

        #[arg(long, value_enum, default_value_t = Mode::Push)]
        mode: Mode,
    },

    /// Look up the weather for a city and print it.
    Show {
        /// City name; defaults to the configured default city.
        city: Option<String>,

        /// Fetch configuration from a running config endpoint.
        #[arg(long, conflicts_with_all = ["page_url", "settings"])]
        config_url: Option<String>,

        /// Read the configuration injected into a served page.
        #[arg(long, conflicts_with = "settings")]
        page_url: Option<String>,

        /// Read configuration from a settings file instead of the environment.
        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// Interactively write a settings file.
    Configure {
        /// Provider short name, e.g. "openweather" or "weatherapi".
        provider: Option<String>,

        #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
        settings: PathBuf,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Serve { root, settings, port, mode } => {
                server::run(ServerState { root, settings, mode }, port).await
            }
            Command::Show { city, config_url, page_url, settings } => {
                let config = resolve_config(config_url, page_url, settings).await?;
                show(config, city).await
            }
            Command::Configure { provider, settings } => configure(provider, settings),
        }
    }
}

async fn resolve_config(
    config_url: Option<String>,
    page_url: Option<String>,
    settings: Option<PathBuf>,
) -> Result<Config> {
    let http = reqwest::Client::new();

    if let Some(url) = config_url {
        return Ok(ConfigLoader::pull(url).load(&http).await);
    }

    if let Some(url) = page_url {
        let html = http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("Failed to fetch page {url}"))?
            .text()
            .await
            .with_context(|| format!("Failed to read page {url}"))?;
        return Ok(ConfigLoader::from_page(&html).load(&http).await);
    }

    if let Some(path) = settings {
        let settings = Settings::load(&path)?;
        return Ok(Config::from_settings(&settings));
    }

    Ok(Config::from_env())
}

async fn show(config: Config, city: Option<String>) -> Result<()> {
    let city = city
        .or_else(|| config.default_city.clone())
        .unwrap_or_else(|| DEFAULT_CITY.to_string());
    debug!(?config.provider, %config.unit, %config.variant, "resolved configuration");

    let language = config.language.clone();
    let show_theme = config.debug;
    let provider = Provider::from_config(&config);
    let mut widget = Widget::new(Arc::new(config), provider, TerminalView::new(show_theme));

    match FileCache::open_default() {
        Ok(cache) => {
            debug!(path = %cache.path().display(), "caching responses");
            let cache: Arc<dyn CacheStore> = Arc::new(cache);
            widget = widget.with_cache(cache);
        }
        Err(err) => warn!(error = %err, "response cache unavailable"),
    }

    match widget.search(&city).await {
        Ok(SearchOutcome::Rendered(snapshot)) => {
            info!(city = %snapshot.city_name, "weather rendered");
            Ok(())
        }
        Ok(SearchOutcome::Superseded) => Ok(()),
        Err(err) => {
            let message = err.user_message(&language);
            Err(err).with_context(|| format!("{message} ({city})"))
        }
    }
}

fn configure(provider: Option<String>, path: PathBuf) -> Result<()> {
    let mut settings = match Settings::load(&path) {
        Ok(settings) => settings,
        Err(SettingsError::NotFound(_)) => Settings::default(),
        Err(err) => return Err(err.into()),
    };
    let current = Config::from_settings(&settings);

    let provider = match provider {
        Some(raw) => ProviderKind::try_from(raw.as_str())?,
        None => {
            let options = ProviderKind::all().to_vec();
            let start = options.iter().position(|p| *p == current.provider).unwrap_or(0);
            Select::new("Weather provider:", options)
                .with_starting_cursor(start)
                .prompt()
                .context("Failed to read provider")?
        }
    };

    let api_key = Password::new(&format!("API key for {provider}:"))
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("Failed to read API key")?;

    let language = Text::new("Language:")
        .with_default(if current.language.is_empty() { DEFAULT_LANGUAGE } else { current.language.as_str() })
        .prompt()
        .context("Failed to read language")?;

    let unit = Select::new("Units:", vec![Unit::Metric, Unit::Imperial])
        .with_starting_cursor(usize::from(current.unit == Unit::Imperial))
        .prompt()
        .context("Failed to read units")?;

    let variant = Select::new("Widget variant:", vec![Variant::Rich, Variant::Simple])
        .with_starting_cursor(usize::from(current.variant == Variant::Simple))
        .prompt()
        .context("Failed to read variant")?;

    let default_city = Text::new("Default city:")
        .with_default(current.default_city.as_deref().unwrap_or(DEFAULT_CITY))
        .prompt()
        .context("Failed to read default city")?;

    if !api_key.trim().is_empty() {
        settings.set(keys::API_KEY, api_key.trim());
    }
    if provider != current.provider {
        settings.set(keys::BASE_URL, provider.default_base_url());
    }
    settings.set(keys::PROVIDER, provider.as_str());
    settings.set(keys::LANGUAGE, language.trim());
    settings.set(keys::UNIT, unit.as_str());
    settings.set(keys::VARIANT, variant.as_str());
    settings.set(keys::DEFAULT_CITY, default_city.trim());

    settings.save(&path)?;

    if Config::from_settings(&settings).has_api_key() {
        println!("Saved settings to {}", path.display());
    } else {
        println!(
            "Saved settings to {} (no API key yet; set {} before searching)",
            path.display(),
            keys::API_KEY
        );
    }
    Ok(())
}
