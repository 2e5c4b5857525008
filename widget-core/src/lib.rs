//! Core library for the weather lookup widget.
//!
//! This crate defines:
//! - Configuration resolution (environment, settings file, injected page, config endpoint)
//! - The two provider schemas and their mapping onto shared domain models
//! - Forecast aggregation, condition categories and display formatting
//! - The search interaction, driven against an abstract [`WeatherView`]
//!
//! It is used by `widget-cli`, which hosts the configuration server and a
//! terminal rendering of the widget.

pub mod cache;
pub mod client;
pub mod condition;
pub mod config;
pub mod error;
pub mod forecast;
pub mod loader;
pub mod model;
pub mod provider;
pub mod settings;
pub mod view;

pub use cache::{CacheEntry, CacheStore, FileCache, MemoryCache};
pub use client::{Phase, SearchOutcome, Widget};
pub use condition::{BackgroundTheme, ConditionCategory, TimeOfDay};
pub use config::{Config, Unit, Variant};
pub use error::{ErrorCategory, SettingsError, WidgetError};
pub use loader::{ConfigLoader, inject_config};
pub use model::{
    Coordinates, CurrentReport, ForecastDay, ForecastSeries, SpeedUnit, TemperatureScale,
    WeatherSnapshot,
};
pub use provider::{Provider, ProviderKind, WeatherProvider};
pub use settings::Settings;
pub use view::{CurrentView, ForecastDayView, WeatherView};
