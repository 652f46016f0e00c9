//! Turns keystrokes into committed queries and owns the fetch lifecycle.
//!
//! All state lives in one [`AppState`] behind a `watch` channel. Every
//! operation below is the only way that state changes; observers get
//! read-only copies via [`QueryController::subscribe`].

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use parking_lot::Mutex;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::FetchError,
    model::{AppState, DisplayOptions, FetchStatus, Metric, Query, SortKey, TemperatureUnit},
    provider::WeatherProvider,
};

/// Knobs the controller needs from configuration.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub debounce: Duration,
    pub request_timeout: Duration,
    pub max_forecast_days: u8,
    pub forecast_days: u8,
    pub hourly_hours: usize,
    pub default_location: Option<String>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ControllerSettings {
    fn from(config: &Config) -> Self {
        Self {
            debounce: config.debounce(),
            request_timeout: config.request_timeout(),
            max_forecast_days: config.max_forecast_days.max(1),
            forecast_days: config.default_forecast_days,
            hourly_hours: config.default_hourly_hours,
            default_location: config.default_location.clone(),
        }
    }
}

/// Handle to a spawned fetch. Awaiting it is optional; the result lands in state either way.
#[derive(Debug)]
pub struct FetchHandle {
    request_id: u64,
    task: JoinHandle<()>,
}

impl FetchHandle {
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Wait until the response (or its rejection as stale) has been applied.
    pub async fn finished(self) {
        if let Err(err) = self.task.await {
            warn!(request_id = self.request_id, error = %err, "fetch task did not complete");
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryController {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    provider: Arc<dyn WeatherProvider>,
    settings: ControllerSettings,
    state: watch::Sender<AppState>,
    /// At most one scheduled commit.
    pending_commit: Mutex<Option<JoinHandle<()>>>,
    next_request_id: AtomicU64,
}

impl QueryController {
    pub fn new(provider: Arc<dyn WeatherProvider>, settings: ControllerSettings) -> Self {
        let initial = AppState {
            forecast_days: clamp_days(settings.forecast_days, settings.max_forecast_days),
            options: DisplayOptions {
                hourly_hours: settings.hourly_hours,
                ..DisplayOptions::default()
            },
            ..AppState::default()
        };

        let (state, _) = watch::channel(initial);

        Self {
            inner: Arc::new(Inner {
                provider,
                settings,
                state,
                pending_commit: Mutex::new(None),
                next_request_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.inner.state.subscribe()
    }

    /// A copy of the current state.
    pub fn state(&self) -> AppState {
        self.inner.state.borrow().clone()
    }

    /// Search the configured default location, if there is one.
    pub fn start(&self) -> Option<FetchHandle> {
        let location = self.inner.settings.default_location.clone()?;
        self.inner.state.send_modify(|s| s.draft = location.clone());
        self.commit_query(&location)
    }

    /// Record a keystroke and (re)schedule the debounced commit.
    ///
    /// Must be called from within a tokio runtime.
    pub fn set_draft_query(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner.state.send_modify(|s| s.draft = text.clone());

        let controller = self.clone();
        let delay = self.inner.settings.debounce;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            controller.commit_query(&text);
        });

        if let Some(previous) = self.inner.pending_commit.lock().replace(task) {
            previous.abort();
        }
    }

    /// Commit `text` as the active query. Fetches only when the committed query changes.
    pub fn commit_query(&self, text: &str) -> Option<FetchHandle> {
        let days = self.inner.state.borrow().forecast_days;
        let query = match Query::new(text, days) {
            Ok(query) => query,
            Err(_) => {
                debug!("ignoring commit of blank search text");
                return None;
            }
        };

        if self.inner.state.borrow().query.as_ref() == Some(&query) {
            debug!(location = query.location(), "committed query unchanged, not refetching");
            return None;
        }

        Some(self.fetch_weather(query))
    }

    /// Change the horizon. Refetches the committed query when the value actually changes.
    pub fn set_forecast_days(&self, days: u8) -> Option<FetchHandle> {
        let days = clamp_days(days, self.inner.settings.max_forecast_days);

        let mut committed = None;
        let changed = self.inner.state.send_if_modified(|s| {
            if s.forecast_days == days {
                return false;
            }
            s.forecast_days = days;
            committed = s.query.clone();
            true
        });

        if !changed {
            return None;
        }
        committed.map(|q| self.fetch_weather(q.with_days(days)))
    }

    /// Explicit "Search" action: skip the debounce and fetch the draft now.
    pub fn handle_search_now(&self) -> Option<FetchHandle> {
        self.cancel_pending_commit();

        let (draft, days) = {
            let state = self.inner.state.borrow();
            (state.draft.clone(), state.forecast_days)
        };

        match Query::new(&draft, days) {
            Ok(query) => Some(self.fetch_weather(query)),
            Err(_) => {
                debug!("search requested with blank draft");
                None
            }
        }
    }

    /// Issue one provider request for `query`. Only the latest request may update state.
    pub fn fetch_weather(&self, query: Query) -> FetchHandle {
        // Allocated under the state lock so id order always matches publish order.
        let mut request_id = 0;
        self.inner.state.send_modify(|s| {
            request_id = self.inner.next_request_id.fetch_add(1, Ordering::Relaxed);
            s.query = Some(query.clone());
            s.status = FetchStatus::Loading;
            s.in_flight = Some(request_id);
        });
        info!(request_id, location = query.location(), days = query.days(), "fetching forecast");

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let timeout = inner.settings.request_timeout;
            let result = match tokio::time::timeout(timeout, inner.provider.forecast(&query)).await
            {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(timeout)),
            };
            inner.apply(request_id, result);
        });

        FetchHandle { request_id, task }
    }

    pub fn set_unit(&self, unit: TemperatureUnit) {
        self.update_options(|o| o.unit = unit);
    }

    pub fn toggle_unit(&self) {
        self.update_options(|o| o.unit = o.unit.toggled());
    }

    pub fn set_sort_key(&self, sort_key: SortKey) {
        self.update_options(|o| o.sort_key = sort_key);
    }

    pub fn set_hourly_hours(&self, hours: usize) {
        self.update_options(|o| o.hourly_hours = hours);
    }

    pub fn toggle_metric(&self, metric: Metric) {
        self.update_options(|o| o.metrics.toggle(metric));
    }

    pub fn set_metric(&self, metric: Metric, enabled: bool) {
        self.update_options(|o| o.metrics.set(metric, enabled));
    }

    pub fn toggle_details(&self) {
        self.update_options(|o| o.details_expanded = !o.details_expanded);
    }

    fn update_options(&self, change: impl FnOnce(&mut DisplayOptions)) {
        self.inner.state.send_if_modified(|s| {
            let before = s.options.clone();
            change(&mut s.options);
            s.options != before
        });
    }

    fn cancel_pending_commit(&self) {
        if let Some(pending) = self.inner.pending_commit.lock().take() {
            pending.abort();
        }
    }
}

impl Inner {
    fn apply(&self, request_id: u64, result: Result<crate::WeatherSnapshot, FetchError>) {
        self.state.send_if_modified(|s| {
            if s.in_flight != Some(request_id) {
                debug!(request_id, latest = ?s.in_flight, "discarding stale forecast response");
                return false;
            }
            s.in_flight = None;

            match result {
                Ok(snapshot) => {
                    info!(request_id, location = %snapshot.location.name, "forecast applied");
                    s.snapshot = Some(snapshot);
                    s.status = FetchStatus::Success;
                }
                Err(err) => {
                    // The previous snapshot, if any, stays on screen under the error.
                    warn!(request_id, error = %err, "forecast request failed");
                    s.status = FetchStatus::Failed(err.to_string());
                }
            }
            true
        });
    }
}

fn clamp_days(days: u8, max: u8) -> u8 {
    days.clamp(1, max.max(1))
}
