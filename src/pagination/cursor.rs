//! Offset pagination cursor
//!
//! The cursor owns offset/limit/total-count state for one pagination session.
//! `start` fetches the first page, every `load_next` fetches the window at
//! `current_offset + offset_step` until the offset reaches the reported total.

use super::types::{CursorConfig, CursorSnapshot, LoadOutcome, NotAdvancing, StartOptions};
use crate::error::{DataSourceError, Error, Result};
use crate::notify::{Notifier, PageLoaded, PaginationComplete, PaginationEvent};
use crate::sink::ResultSink;
use crate::source::DataSource;
use crate::types::{JsonObject, Page};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Fetch currently dispatched by the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InFlight {
    Initial,
    Next,
}

#[derive(Debug, Clone)]
struct Session {
    model_name: String,
    limit: u64,
    offset_step: u64,
    current_offset: u64,
    total_count: Option<u64>,
    exhausted: bool,
    completion_notified: bool,
    first_page_loaded: bool,
    extra_params: JsonObject,
    model_path: Option<String>,
}

impl Session {
    fn new(model_name: &str, options: StartOptions) -> Self {
        let limit = options.resolved_limit();
        let offset_step = options.resolved_offset_step();
        Self {
            model_name: model_name.to_string(),
            limit,
            offset_step,
            current_offset: options.initial_offset.unwrap_or(0),
            total_count: None,
            exhausted: false,
            completion_notified: false,
            first_page_loaded: false,
            extra_params: options.extra,
            model_path: options.model_path,
        }
    }

    /// Request for the window at `offset`; extra params are merged last
    fn request(&self, config: &CursorConfig, offset: u64) -> JsonObject {
        let mut params = JsonObject::new();
        params.insert(config.limit_param.clone(), self.limit.into());
        params.insert(config.offset_param.clone(), offset.into());
        for (key, value) in &self.extra_params {
            params.insert(key.clone(), value.clone());
        }
        params
    }

    fn observe_total(&mut self, page: &Page, path: &str) {
        let Some(total) = page.count_at(path) else {
            return;
        };
        if let Some(previous) = self.total_count {
            if previous != total {
                warn!(
                    model = %self.model_name,
                    previous,
                    total,
                    "Total count changed between pages"
                );
            }
        }
        self.total_count = Some(total);
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
            || self.limit == 0
            || self.offset_step == 0
            || self
                .total_count
                .is_some_and(|total| self.current_offset >= total)
    }

    /// Latch exhaustion; it never reverts within a session
    fn refresh_exhausted(&mut self) -> bool {
        self.exhausted = self.is_exhausted();
        self.exhausted
    }

    /// Completion event, handed out at most once per session
    fn take_completion(&mut self) -> Option<PaginationComplete> {
        if self.exhausted && !self.completion_notified {
            self.completion_notified = true;
            Some(PaginationComplete {
                total_count: self.total_count,
            })
        } else {
            None
        }
    }

    fn snapshot(&self, loading_more: bool) -> CursorSnapshot {
        CursorSnapshot {
            model_name: self.model_name.clone(),
            limit: self.limit,
            offset_step: self.offset_step,
            current_offset: self.current_offset,
            total_count: self.total_count,
            loading_more,
            exhausted: self.is_exhausted(),
            extra_params: self.extra_params.clone(),
            model_path: self.model_path.clone(),
        }
    }
}

/// Clears the in-flight flag when a fetch settles or its future is dropped
struct InFlightGuard<'a>(&'a Mutex<CursorState>);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).in_flight = None;
    }
}

#[derive(Debug, Default)]
struct CursorState {
    session: Option<Session>,
    in_flight: Option<InFlight>,
}

/// Offset-based "infinite scroll" cursor
///
/// Generic over the [`DataSource`] it fetches from, the [`ResultSink`] it
/// appends into, and the [`Notifier`] that schedules `PageLoaded` and
/// `PaginationComplete` events.
///
/// All methods take `&self`. The internal lock is never held across an
/// `.await`, and at most one fetch is in flight per cursor: a `load_next`
/// issued while another fetch is pending returns
/// [`NotAdvancing::Busy`] without touching the data source.
pub struct PaginationCursor<S, K, N = ()> {
    source: S,
    sink: K,
    notifier: N,
    config: CursorConfig,
    state: Mutex<CursorState>,
}

impl<S, K> PaginationCursor<S, K, ()> {
    /// Create a cursor with default field names and no notifications
    pub fn new(source: S, sink: K) -> Self {
        Self {
            source,
            sink,
            notifier: (),
            config: CursorConfig::default(),
            state: Mutex::new(CursorState::default()),
        }
    }
}

impl<S, K, N> PaginationCursor<S, K, N> {
    /// Replace the notifier
    pub fn with_notifier<M>(self, notifier: M) -> PaginationCursor<S, K, M> {
        PaginationCursor {
            source: self.source,
            sink: self.sink,
            notifier,
            config: self.config,
            state: self.state,
        }
    }

    /// Set request/response field names
    #[must_use]
    pub fn with_config(mut self, config: CursorConfig) -> Self {
        self.config = config;
        self
    }

    /// Field name configuration
    pub fn config(&self) -> &CursorConfig {
        &self.config
    }

    /// The data source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The result sink
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// The notifier
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Check if `start` has been called
    pub fn is_started(&self) -> bool {
        self.state().session.is_some()
    }

    /// Current session state, `None` before `start`
    pub fn snapshot(&self) -> Option<CursorSnapshot> {
        let state = self.state();
        let loading_more = state.in_flight == Some(InFlight::Next);
        state
            .session
            .as_ref()
            .map(|session| session.snapshot(loading_more))
    }

    /// Model identifier of the session
    pub fn model_name(&self) -> Option<String> {
        self.with_session(|s| s.model_name.clone())
    }

    /// Model path recorded at `start`
    pub fn model_path(&self) -> Option<String> {
        self.with_session(|s| s.model_path.clone()).flatten()
    }

    /// Page size of the session
    pub fn limit(&self) -> Option<u64> {
        self.with_session(|s| s.limit)
    }

    /// Offset increment of the session
    pub fn offset_step(&self) -> Option<u64> {
        self.with_session(|s| s.offset_step)
    }

    /// Offset most recently consumed (0 before `start`)
    pub fn current_offset(&self) -> u64 {
        self.with_session(|s| s.current_offset).unwrap_or(0)
    }

    /// Total count, once a response has reported it
    pub fn total_count(&self) -> Option<u64> {
        self.with_session(|s| s.total_count).flatten()
    }

    /// Pass-through parameters captured at `start`
    pub fn extra_params(&self) -> JsonObject {
        self.with_session(|s| s.extra_params.clone())
            .unwrap_or_default()
    }

    /// Check if a follow-up fetch is in flight
    pub fn is_loading_more(&self) -> bool {
        self.state().in_flight == Some(InFlight::Next)
    }

    /// Check if any fetch (first page or follow-up) is in flight
    pub fn is_loading(&self) -> bool {
        self.state().in_flight.is_some()
    }

    /// Check if no more pages will be requested
    pub fn is_exhausted(&self) -> bool {
        self.with_session(Session::is_exhausted).unwrap_or(false)
    }

    /// Check if more pages may be requested
    ///
    /// False until the session's first page has loaded.
    pub fn can_load_more(&self) -> bool {
        self.with_session(|s| s.first_page_loaded && !s.is_exhausted())
            .unwrap_or(false)
    }

    fn with_session<R>(&self, f: impl FnOnce(&Session) -> R) -> Option<R> {
        self.state().session.as_ref().map(f)
    }

    fn state(&self) -> MutexGuard<'_, CursorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S, K, N> PaginationCursor<S, K, N>
where
    S: DataSource,
    K: ResultSink,
    N: Notifier,
{
    /// Begin a pagination session and fetch its first page
    ///
    /// Session state is captured before the fetch is awaited, so accessors
    /// reflect the new limit/offset immediately. Calling `start` again once the
    /// previous fetch has settled replaces the session and clears the sink.
    pub async fn start(&self, model_name: &str, options: StartOptions) -> Result<PageLoaded> {
        if model_name.trim().is_empty() {
            return Err(Error::invalid_argument("model name must not be empty"));
        }

        let (offset, params, replaced) = {
            let mut state = self.state();
            if state.in_flight.is_some() {
                return Err(Error::invalid_argument(
                    "cannot start a new session while a fetch is in flight",
                ));
            }

            let session = Session::new(model_name, options);
            let offset = session.current_offset;
            let params = session.request(&self.config, offset);
            debug!(
                model = model_name,
                limit = session.limit,
                offset_step = session.offset_step,
                offset,
                "Starting pagination session"
            );

            let replaced = state.session.replace(session).is_some();
            state.in_flight = Some(InFlight::Initial);
            (offset, params, replaced)
        };

        let _in_flight = InFlightGuard(&self.state);
        if replaced {
            self.sink.clear();
            self.sink.set_exhausted(false);
        }

        let fetched = self.source.fetch_page(model_name, &params).await;
        self.settle(offset, fetched)
    }

    /// Fetch the next window
    ///
    /// Returns [`LoadOutcome::NotAdvancing`] without fetching while another
    /// fetch is in flight or once the session is exhausted. On failure the
    /// offset is left unchanged, so calling again retries the same window.
    ///
    /// Fails with `InvalidArgument` when there is no session or when the
    /// session's first page never loaded; `start` must succeed first.
    pub async fn load_next(&self) -> Result<LoadOutcome> {
        let (model_name, offset, params) = {
            let mut state = self.state();
            let busy = state.in_flight.is_some();
            let Some(session) = state.session.as_mut() else {
                return Err(Error::invalid_argument(
                    "no pagination session; call start first",
                ));
            };

            if busy {
                debug!(model = %session.model_name, "Fetch in flight, not advancing");
                return Ok(LoadOutcome::NotAdvancing(NotAdvancing::Busy));
            }

            if !session.first_page_loaded {
                return Err(Error::invalid_argument(
                    "initial fetch did not succeed; call start again",
                ));
            }

            if session.refresh_exhausted() {
                let complete = session.take_completion();
                drop(state);
                self.sink.set_exhausted(true);
                if let Some(event) = complete {
                    self.schedule_complete(event);
                }
                return Ok(LoadOutcome::NotAdvancing(NotAdvancing::Exhausted));
            }

            let offset = session.current_offset.saturating_add(session.offset_step);
            let params = session.request(&self.config, offset);
            let model_name = session.model_name.clone();
            debug!(model = %model_name, offset, "Loading next page");

            state.in_flight = Some(InFlight::Next);
            (model_name, offset, params)
        };

        let _in_flight = InFlightGuard(&self.state);
        let fetched = self.source.fetch_page(&model_name, &params).await;
        self.settle(offset, fetched).map(LoadOutcome::Advanced)
    }

    /// Apply a settled fetch for the window at `offset`
    ///
    /// State is updated under the lock; the sink is updated after the lock is
    /// released and before events are scheduled, so sinks and listeners may
    /// read the cursor. The caller's [`InFlightGuard`] clears the in-flight
    /// flag only after this returns, so appends and events from consecutive
    /// fetches cannot interleave.
    fn settle(
        &self,
        offset: u64,
        fetched: std::result::Result<Page, DataSourceError>,
    ) -> Result<PageLoaded> {
        let page = fetched?;
        let mut state = self.state();

        let Some(session) = state.session.as_mut() else {
            return Err(Error::invalid_argument("pagination session was cleared"));
        };

        session.current_offset = offset;
        session.first_page_loaded = true;
        session.observe_total(&page, &self.config.total_count_param);
        let exhausted = session.refresh_exhausted();

        debug!(
            model = %session.model_name,
            offset,
            items = page.items.len(),
            total_count = ?session.total_count,
            exhausted,
            "Page loaded"
        );

        let loaded = PageLoaded {
            current_offset: offset,
            total_count: session.total_count,
            new_items: page.items,
        };
        let complete = session.take_completion();
        drop(state);

        self.sink.append(&loaded.new_items);
        self.sink.set_exhausted(exhausted);

        self.notifier
            .schedule(PaginationEvent::PageLoaded(loaded.clone()));
        if let Some(event) = complete {
            self.schedule_complete(event);
        }

        Ok(loaded)
    }

    fn schedule_complete(&self, event: PaginationComplete) {
        info!(total_count = ?event.total_count, "Pagination complete");
        self.notifier.schedule(PaginationEvent::Complete(event));
    }
}

impl<S, K, N> std::fmt::Debug for PaginationCursor<S, K, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationCursor")
            .field("config", &self.config)
            .field("session", &self.snapshot())
            .finish_non_exhaustive()
    }
}
