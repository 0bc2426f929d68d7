//! # Application state and session
//!
//! [`App`] owns everything the pipeline needs: the post store, the filter
//! state, the view mode, the debounce timer, and the two surfaces. Events go
//! in through [`App::dispatch`], which mutates state and renders when an
//! event calls for it. Nothing is rendered behind the caller's back.
//!
//! | event              | effect                                                    |
//! |--------------------|-----------------------------------------------------------|
//! | `FilterChanged`    | update the filter; if it changed, restart the debounce    |
//! | `DebounceElapsed`  | render, if the debounce deadline has passed               |
//! | `MonthSelected`    | number the request and ask the caller to fetch it         |
//! | `DataLoaded`       | if it answers the latest request: load (or clear) and render |
//! | `ToggleView`       | flip map/list and render with the latest filters          |
//!
//! Every `MonthSelected` gets a fresh request number, and a response is only
//! accepted when it carries the latest one. Selecting the same month twice
//! still makes the first response stale, so a slow fetch can never overwrite
//! a newer one.
//!
//! [`Session`] drives an `App` on a tokio runtime: it reads events from a
//! channel, runs fetches as tasks, sleeps until the debounce deadline, and
//! publishes a [`Status`] snapshot after every event.
//!
//! ```rust,no_run
//! use hnmapped::prelude::*;
//! # async fn example() -> Result<(), HnMappedError> {
//! let app = App::new(AppConfig::default(), HtmlList::default(), MapCanvas::default());
//! let (session, handle) = Session::new(app, DirSource::new("web/data"));
//! let task = tokio::spawn(session.run());
//!
//! handle.select_month("2014-03".parse()?).await?;
//! handle.set_filter(FilterKey::TextFilter, "rust").await?;
//! drop(handle);
//! let app = task.await.expect("session task")?;
//! println!("{}", app.status().line);
//! # Ok(())
//! # }
//! ```

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tokio::{
    sync::{mpsc, watch},
    task::JoinSet,
    time::{Instant, sleep_until},
};
use tracing::{debug, info, warn};

use crate::{
    DEFAULT_DEBOUNCE_MS, Result,
    config::DEBOUNCE_MS_ENV,
    debounce::Debouncer,
    filters::{FilterKey, FilterState},
    html::escape,
    months::MonthKey,
    posts::{Dataset, PostStore, RawPost},
    prelude::*,
    render::{ListSurface, MapSurface, RenderResult, render_posts},
    source::DataSource,
    template::{self, STATUS_TEMPLATE, View},
    views::{ViewMode, ViewModeController},
};

/// Capacity of the session's event channel
const EVENT_QUEUE: usize = 64;

// ============================================================================
// CONFIG
// ============================================================================

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Quiet period after the last filter change before rendering.
    ///
    /// Defaults to `DEFAULT_DEBOUNCE_MS`, or the env override if set:
    /// `HNMAPPED_DEBOUNCE_MS`.
    pub debounce: Duration,

    /// View mode at startup
    pub initial_view: ViewMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            debounce: Duration::from_millis(
                std::env::var(DEBOUNCE_MS_ENV)
                    .ok()
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_DEBOUNCE_MS),
            ),
            initial_view: ViewMode::default(),
        }
    }
}

impl AppConfig {
    /// Sets the debounce quiet period.
    pub fn debounce(self, debounce: Duration) -> Self {
        AppConfig { debounce, ..self }
    }

    pub fn initial_view(self, initial_view: ViewMode) -> Self {
        AppConfig {
            initial_view,
            ..self
        }
    }
}

// ============================================================================
// EVENTS
// ============================================================================

/// Inputs to [`App::dispatch`]
#[derive(Debug)]
pub enum Event {
    /// A filter input changed
    FilterChanged { key: FilterKey, value: String },
    /// The debounce timer may have expired
    DebounceElapsed,
    /// The user picked a month
    MonthSelected(MonthKey),
    /// A fetch finished. `request` is the number from the `Fetch` command.
    DataLoaded {
        month: MonthKey,
        request: u64,
        result: Result<Vec<RawPost>>,
    },
    /// Switch between map and list
    ToggleView,
}

impl Event {
    /// Shorthand for `FilterChanged`
    pub fn filter(key: FilterKey, value: impl Into<String>) -> Self {
        Event::FilterChanged {
            key,
            value: value.into(),
        }
    }
}

/// Work the caller must perform on behalf of the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Fetch the month, then dispatch `DataLoaded` with the outcome and the
    /// same request number.
    Fetch { month: MonthKey, request: u64 },
}

/// Snapshot of what the user sees
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    /// Month of the dataset on screen
    pub month: Option<MonthKey>,
    /// Last month requested; differs from `month` while a fetch is in flight
    pub requested: Option<MonthKey>,
    pub mode: ViewMode,
    pub toggle_label: &'static str,
    /// Outcome of the last render
    pub result: RenderResult,
    /// Number of renders so far
    pub renders: u64,
    /// Status line html
    pub line: String,
    /// Load failure, invalid filter pattern, or rejected input
    pub message: Option<String>,
    /// A filter change is waiting for the debounce to expire
    pub pending: bool,
}

// ============================================================================
// APP
// ============================================================================

/// Application state
pub struct App<L, M> {
    store: PostStore,
    filters: FilterState,
    views: ViewModeController,
    debounce: Debouncer,
    requested: Option<MonthKey>,
    // number of the latest MonthSelected
    request: u64,
    list: L,
    map: M,
    last: RenderResult,
    renders: u64,
    load_error: Option<String>,
    line: String,
}

impl<L: ListSurface, M: MapSurface> App<L, M> {
    pub fn new(config: AppConfig, list: L, map: M) -> Self {
        Self {
            store: PostStore::default(),
            filters: FilterState::default(),
            views: ViewModeController::new(config.initial_view),
            debounce: Debouncer::new(config.debounce),
            requested: None,
            request: 0,
            list,
            map,
            last: RenderResult::default(),
            renders: 0,
            load_error: None,
            line: String::new(),
        }
    }

    /// Applies one event at instant `now`.
    ///
    /// Returns a command when the caller has work to do. Errors are
    /// rejected inputs (an invalid tri-state value); state is unchanged.
    pub fn dispatch(&mut self, event: Event, now: Instant) -> Result<Option<Command>> {
        match event {
            Event::FilterChanged { key, value } => {
                if self.filters.set(key, &value)? {
                    debug!(%key, value = %value, "filter changed");
                    self.debounce.schedule(now);
                }
            }
            Event::DebounceElapsed => {
                if self.debounce.fire_if_due(now) {
                    self.refresh()?;
                }
            }
            Event::MonthSelected(month) => {
                self.request += 1;
                debug!(%month, request = self.request, "month selected");
                self.requested = Some(month);
                return Ok(Some(Command::Fetch {
                    month,
                    request: self.request,
                }));
            }
            Event::DataLoaded { month, request, result } => {
                if request != self.request || self.requested != Some(month) {
                    warn!(
                        %month,
                        request,
                        latest = self.request,
                        requested = ?self.requested,
                        "ignoring response to a superseded request"
                    );
                    return Ok(None);
                }
                self.load(month, result);
                // the render below uses the latest filters
                self.debounce.cancel();
                self.refresh()?;
            }
            Event::ToggleView => {
                let mode = self.views.toggle();
                debug!(%mode, "view toggled");
                // this render already uses the latest filters
                self.debounce.cancel();
                self.refresh()?;
            }
        }
        Ok(None)
    }

    fn load(&mut self, month: MonthKey, result: Result<Vec<RawPost>>) {
        match result {
            Ok(raw) => {
                self.store.load(month, raw);
                self.load_error = None;
            }
            Err(err) => {
                warn!(%month, "load failed: {err}");
                self.store.clear();
                self.load_error = Some(err.to_string());
            }
        }
    }

    /// Renders the active dataset with the current filters and mode.
    pub fn refresh(&mut self) -> Result<RenderResult> {
        let posts = self.store.active().map_or(&[][..], |dataset| dataset.posts());
        let result = render_posts(
            posts,
            &self.filters,
            self.views.mode(),
            &mut self.list,
            &mut self.map,
        )?;
        self.renders += 1;
        self.last = result;
        self.line = match &self.load_error {
            Some(message) => format!("<p>{}</p>", escape(message)),
            None => template::render(
                STATUS_TEMPLATE,
                &View::from([("count", result.count.to_string())]),
            )?,
        };
        Ok(result)
    }

    /// Renders now if a filter change is waiting on the debounce.
    pub fn flush(&mut self) -> Result<bool> {
        if !self.debounce.is_pending() {
            return Ok(false);
        }
        self.debounce.cancel();
        self.refresh()?;
        Ok(true)
    }

    pub fn status(&self) -> Status {
        let message = self.load_error.clone().or_else(|| {
            self.filters
                .invalid_pattern()
                .map(|(key, pattern)| match pattern {
                    TextPattern::Invalid { error, .. } => format!("invalid {key} pattern: {error}"),
                    _ => format!("invalid {key} pattern"),
                })
        });
        Status {
            month: self.store.active_month(),
            requested: self.requested,
            mode: self.views.mode(),
            toggle_label: self.views.toggle_label(),
            result: self.last,
            renders: self.renders,
            line: self.line.clone(),
            message,
            pending: self.debounce.is_pending(),
        }
    }
}

impl<L, M> App<L, M> {
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn mode(&self) -> ViewMode {
        self.views.mode()
    }

    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        self.store.active()
    }

    pub fn requested_month(&self) -> Option<MonthKey> {
        self.requested
    }

    /// When the pending filter change will render
    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    pub fn last_render(&self) -> RenderResult {
        self.last
    }

    /// Number of renders so far
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    pub fn list(&self) -> &L {
        &self.list
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    /// Consumes the app, returning the list and map surfaces.
    pub fn into_surfaces(self) -> (L, M) {
        (self.list, self.map)
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// Sends events to a running [`Session`] and watches its status.
///
/// Dropping every handle ends the session.
#[derive(Clone)]
pub struct SessionHandle {
    events: mpsc::Sender<Event>,
    status: watch::Receiver<Status>,
}

impl SessionHandle {
    pub async fn send(&self, event: Event) -> Result<()> {
        self.events.send(event).await.map_err(|_| HnMappedError::Other {
            message: "session has ended".to_string(),
        })
    }

    pub async fn set_filter(&self, key: FilterKey, value: impl Into<String>) -> Result<()> {
        self.send(Event::filter(key, value)).await
    }

    pub async fn select_month(&self, month: MonthKey) -> Result<()> {
        self.send(Event::MonthSelected(month)).await
    }

    pub async fn toggle_view(&self) -> Result<()> {
        self.send(Event::ToggleView).await
    }

    /// Latest published status
    pub fn status(&self) -> Status {
        self.status.borrow().clone()
    }

    /// A receiver that is notified on every status change
    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.status.clone()
    }
}

/// Runs an [`App`] on the tokio runtime.
///
/// Events are handled one at a time, so a render always completes before the
/// next event is seen. Fetches run as tasks and report back as `DataLoaded`.
pub struct Session<S, L, M> {
    app: App<L, M>,
    source: Arc<S>,
    events: mpsc::Receiver<Event>,
    fetches: JoinSet<Event>,
    status: watch::Sender<Status>,
}

impl<S, L, M> Session<S, L, M>
where
    S: DataSource + 'static,
    L: ListSurface,
    M: MapSurface,
{
    pub fn new(app: App<L, M>, source: S) -> (Self, SessionHandle) {
        Self::with_shared_source(app, Arc::new(source))
    }

    /// Like `new`, for a source that is also used elsewhere
    pub fn with_shared_source(app: App<L, M>, source: Arc<S>) -> (Self, SessionHandle) {
        let (events_tx, events) = mpsc::channel(EVENT_QUEUE);
        let (status, status_rx) = watch::channel(app.status());
        let session = Self {
            app,
            source,
            events,
            fetches: JoinSet::new(),
            status,
        };
        let handle = SessionHandle {
            events: events_tx,
            status: status_rx,
        };
        (session, handle)
    }

    /// Processes events until every handle is dropped, then renders any
    /// pending filter change and returns the app. Unfinished fetches are
    /// aborted.
    pub async fn run(mut self) -> Result<App<L, M>> {
        info!("session started");
        loop {
            let deadline = self.app.debounce_deadline();
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => self.handle(event),
                    None => break,
                },
                Some(joined) = self.fetches.join_next() => match joined {
                    Ok(event) => self.handle(event),
                    Err(err) => warn!("fetch task failed: {err}"),
                },
                () = wait_for(deadline) => self.handle(Event::DebounceElapsed),
            }
        }
        if self.app.flush()? {
            self.publish(None);
        }
        self.fetches.abort_all();
        info!(renders = self.app.render_count(), "session ended");
        Ok(self.app)
    }

    fn handle(&mut self, event: Event) {
        let rejected = match self.app.dispatch(event, Instant::now()) {
            Ok(Some(Command::Fetch { month, request })) => {
                self.spawn_fetch(month, request);
                None
            }
            Ok(None) => None,
            Err(err) => {
                warn!("rejected event: {err}");
                Some(err.to_string())
            }
        };
        self.publish(rejected);
    }

    fn spawn_fetch(&mut self, month: MonthKey, request: u64) {
        let source = self.source.clone();
        self.fetches.spawn(async move {
            let result = source.fetch(&month).await;
            Event::DataLoaded { month, request, result }
        });
    }

    fn publish(&self, rejected: Option<String>) {
        let mut status = self.app.status();
        if rejected.is_some() {
            status.message = rejected;
        }
        self.status.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
