//! The search interaction: validate, fetch, map, render.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{
    Config, Variant, WidgetError,
    cache::{CacheEntry, CacheStore},
    forecast::{FORECAST_DAYS, aggregate_daily},
    model::{Coordinates, WeatherSnapshot},
    provider::WeatherProvider,
    view::{CurrentView, ForecastDayView, WeatherView},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// This search's result is what the view now shows.
    Rendered(WeatherSnapshot),
    /// A later search started before this one resolved; its result was dropped.
    Superseded,
}

#[derive(Debug)]
struct State {
    phase: Phase,
    current: Option<WeatherSnapshot>,
}

/// One weather widget: a provider, a view, and the state between them.
///
/// Every search takes a sequence ticket when it starts; only the newest
/// ticket may touch the view, so a slow earlier response never overwrites a
/// later one.
pub struct Widget<P, V> {
    config: Arc<Config>,
    provider: P,
    view: Mutex<V>,
    cache: Option<Arc<dyn CacheStore>>,
    state: Mutex<State>,
    latest: AtomicU64,
}

impl<P, V> std::fmt::Debug for Widget<P, V>
where
    P: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Widget")
            .field("provider", &self.provider)
            .field("latest", &self.latest.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<P, V> Widget<P, V>
where
    P: WeatherProvider,
    V: WeatherView,
{
    pub fn new(config: Arc<Config>, provider: P, view: V) -> Self {
        Self {
            config,
            provider,
            view: Mutex::new(view),
            cache: None,
            state: Mutex::new(State { phase: Phase::Idle, current: None }),
            latest: AtomicU64::new(0),
        }
    }

    /// Record every successful response in `cache`.
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase
    }

    /// The snapshot currently on display.
    pub async fn current(&self) -> Option<WeatherSnapshot> {
        self.state.lock().await.current.clone()
    }

    /// Run the view through `f`, e.g. to inspect what was rendered.
    pub async fn with_view<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        f(&*self.view.lock().await)
    }

    /// Search for `input` and update the view with the outcome.
    #[instrument(skip(self))]
    pub async fn search(&self, input: &str) -> Result<SearchOutcome, WidgetError> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        let city = input.trim();
        if city.is_empty() {
            return self.fail(ticket, WidgetError::Validation).await;
        }
        if !self.config.has_api_key() {
            return self.fail(ticket, WidgetError::ConfigurationMissing).await;
        }

        {
            let mut state = self.state.lock().await;
            if !self.is_latest(ticket) {
                debug!(ticket, "search superseded before it started");
                return Ok(SearchOutcome::Superseded);
            }
            state.phase = Phase::Loading;
            self.view.lock().await.show_loading();
        }

        let report = match self.provider.fetch_current(city).await {
            Ok(report) => report,
            Err(err) => return self.fail(ticket, err).await,
        };

        if let Some(cache) = &self.cache {
            if let Err(err) = cache.put(CacheEntry::new(city, report.raw.clone())).await {
                warn!(city, error = %err, "failed to cache weather response");
            }
        }

        {
            let mut state = self.state.lock().await;
            if !self.is_latest(ticket) {
                debug!(ticket, "discarding superseded response");
                return Ok(SearchOutcome::Superseded);
            }
            let current = CurrentView::build(&report, &self.config);
            self.view.lock().await.render_current(&current);
            state.current = Some(report.snapshot.clone());
            state.phase = Phase::Success;
        }
        info!(city = %report.snapshot.city_name, "weather rendered");

        if self.config.variant == Variant::Rich && self.provider.supports_forecast() {
            match report.coordinates {
                Some(at) => self.load_forecast(ticket, at).await,
                None => debug!("response carried no coordinates, skipping forecast"),
            }
        }

        Ok(SearchOutcome::Rendered(report.snapshot))
    }

    /// Fetch and render the forecast. Failure leaves the current view as is.
    async fn load_forecast(&self, ticket: u64, at: Coordinates) {
        let series = match self.provider.fetch_forecast(at).await {
            Ok(series) => series,
            Err(err) => {
                warn!(error = %err, lat = at.lat, lon = at.lon, "forecast unavailable");
                return;
            }
        };

        let days: Vec<ForecastDayView> = aggregate_daily(&series, FORECAST_DAYS)
            .iter()
            .map(ForecastDayView::build)
            .collect();

        let _state = self.state.lock().await;
        if self.is_latest(ticket) {
            self.view.lock().await.render_forecast(&days);
        } else {
            debug!(ticket, "discarding superseded forecast");
        }
    }

    async fn fail(&self, ticket: u64, err: WidgetError) -> Result<SearchOutcome, WidgetError> {
        let mut state = self.state.lock().await;
        if !self.is_latest(ticket) {
            debug!(ticket, error = %err, "discarding superseded failure");
            return Ok(SearchOutcome::Superseded);
        }

        warn!(error = %err, "search failed");
        let message = err.user_message(&self.config.language);
        self.view.lock().await.show_error(&err, message);
        state.phase = Phase::Error;
        Err(err)
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}
