//! Pagination notifications
//!
//! The cursor never calls listeners from inside a fetch continuation directly.
//! It hands every [`PaginationEvent`] to a [`Notifier`], which decides when the
//! caller sees it:
//!
//! - `()` drops events
//! - [`Immediate`] calls a listener synchronously on settlement
//! - [`Deferred`] queues events until the caller flushes after its own render step
//! - `tokio::sync::mpsc::UnboundedSender<PaginationEvent>` forwards to a channel
//!
//! Events are always scheduled in the order their fetches settle.

use crate::types::Record;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::UnboundedSender;

// ============================================================================
// Events
// ============================================================================

/// A page was fetched and appended to the sink
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLoaded {
    /// Offset the page was requested at
    pub current_offset: u64,
    /// Total count known after this page
    pub total_count: Option<u64>,
    /// Records carried by this page
    pub new_items: Vec<Record>,
}

/// No more pages will be requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationComplete {
    /// Total count that ended pagination
    pub total_count: Option<u64>,
}

/// Event emitted by the cursor
#[derive(Debug, Clone, PartialEq)]
pub enum PaginationEvent {
    /// See [`PageLoaded`]
    PageLoaded(PageLoaded),
    /// See [`PaginationComplete`]
    Complete(PaginationComplete),
}

impl PaginationEvent {
    /// Deliver this event to the matching listener method
    pub fn dispatch<L: PaginationListener + ?Sized>(&self, listener: &L) {
        match self {
            Self::PageLoaded(event) => listener.on_page_loaded(event),
            Self::Complete(event) => listener.on_pagination_complete(event),
        }
    }

    /// Check if this is a completion event
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}

// ============================================================================
// Listeners
// ============================================================================

/// Caller-supplied handlers
pub trait PaginationListener: Send + Sync {
    /// Called after every successful fetch
    fn on_page_loaded(&self, _event: &PageLoaded) {}

    /// Called exactly once per session, when exhaustion is first detected
    fn on_pagination_complete(&self, _event: &PaginationComplete) {}
}

type PageLoadedFn = Box<dyn Fn(&PageLoaded) + Send + Sync>;
type CompleteFn = Box<dyn Fn(&PaginationComplete) + Send + Sync>;

/// Listener built from closures
#[derive(Default)]
pub struct Callbacks {
    page_loaded: Option<PageLoadedFn>,
    complete: Option<CompleteFn>,
}

impl Callbacks {
    /// Create a listener with no handlers
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page-loaded handler
    #[must_use]
    pub fn on_page_loaded(mut self, f: impl Fn(&PageLoaded) + Send + Sync + 'static) -> Self {
        self.page_loaded = Some(Box::new(f));
        self
    }

    /// Set the completion handler
    #[must_use]
    pub fn on_complete(
        mut self,
        f: impl Fn(&PaginationComplete) + Send + Sync + 'static,
    ) -> Self {
        self.complete = Some(Box::new(f));
        self
    }
}

impl PaginationListener for Callbacks {
    fn on_page_loaded(&self, event: &PageLoaded) {
        if let Some(f) = &self.page_loaded {
            f(event);
        }
    }

    fn on_pagination_complete(&self, event: &PaginationComplete) {
        if let Some(f) = &self.complete {
            f(event);
        }
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("page_loaded", &self.page_loaded.is_some())
            .field("complete", &self.complete.is_some())
            .finish()
    }
}

// ============================================================================
// Notifiers
// ============================================================================

/// Scheduling hook between the cursor and the caller's listeners
pub trait Notifier: Send + Sync {
    /// Schedule delivery of `event`
    fn schedule(&self, event: PaginationEvent);
}

impl Notifier for () {
    fn schedule(&self, _event: PaginationEvent) {}
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn schedule(&self, event: PaginationEvent) {
        (**self).schedule(event);
    }
}

impl Notifier for UnboundedSender<PaginationEvent> {
    fn schedule(&self, event: PaginationEvent) {
        // A closed channel means nobody is listening anymore.
        let _ = self.send(event);
    }
}

/// Delivers events synchronously on settlement
#[derive(Debug, Default)]
pub struct Immediate<L>(pub L);

impl<L: PaginationListener> Notifier for Immediate<L> {
    fn schedule(&self, event: PaginationEvent) {
        event.dispatch(&self.0);
    }
}

/// Queues events until the caller flushes them
#[derive(Debug, Default)]
pub struct Deferred {
    queue: Mutex<VecDeque<PaginationEvent>>,
}

impl Deferred {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events waiting for delivery
    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Remove queued events without delivering them
    pub fn take(&self) -> Vec<PaginationEvent> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    /// Deliver queued events in order, returning how many were delivered
    pub fn flush<L: PaginationListener + ?Sized>(&self, listener: &L) -> usize {
        let events = self.take();
        for event in &events {
            event.dispatch(listener);
        }
        events.len()
    }
}

impl Notifier for Deferred {
    fn schedule(&self, event: PaginationEvent) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn loaded(offset: u64) -> PaginationEvent {
        PaginationEvent::PageLoaded(PageLoaded {
            current_offset: offset,
            total_count: Some(10),
            new_items: vec![json!({"id": offset})],
        })
    }

    #[derive(Default)]
    struct Recorder {
        offsets: Mutex<Vec<u64>>,
        completes: AtomicUsize,
    }

    impl PaginationListener for Recorder {
        fn on_page_loaded(&self, event: &PageLoaded) {
            self.offsets.lock().unwrap().push(event.current_offset);
        }

        fn on_pagination_complete(&self, _event: &PaginationComplete) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_immediate_dispatches_synchronously() {
        let notifier = Immediate(Recorder::default());
        notifier.schedule(loaded(0));
        notifier.schedule(PaginationEvent::Complete(PaginationComplete {
            total_count: Some(10),
        }));

        assert_eq!(*notifier.0.offsets.lock().unwrap(), vec![0]);
        assert_eq!(notifier.0.completes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_deferred_holds_events_until_flush() {
        let notifier = Deferred::new();
        let recorder = Recorder::default();

        notifier.schedule(loaded(0));
        notifier.schedule(loaded(5));
        assert_eq!(notifier.pending(), 2);
        assert!(recorder.offsets.lock().unwrap().is_empty());

        assert_eq!(notifier.flush(&recorder), 2);
        assert_eq!(*recorder.offsets.lock().unwrap(), vec![0, 5]);
        assert_eq!(notifier.pending(), 0);
        assert_eq!(notifier.flush(&recorder), 0);
    }

    #[test]
    fn test_callbacks_listener() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in_handler = Arc::clone(&seen);
        let callbacks = Callbacks::new().on_page_loaded(move |event| {
            seen_in_handler.fetch_add(event.new_items.len(), Ordering::SeqCst);
        });

        loaded(3).dispatch(&callbacks);
        // no completion handler set
        PaginationEvent::Complete(PaginationComplete { total_count: None }).dispatch(&callbacks);

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(format!("{callbacks:?}").contains("page_loaded: true"));
    }

    #[tokio::test]
    async fn test_channel_notifier() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        tx.schedule(loaded(7));

        let event = rx.recv().await.unwrap();
        assert_eq!(event, loaded(7));
        assert!(!event.is_complete());

        drop(rx);
        tx.schedule(loaded(8));
    }

    #[test]
    fn test_page_loaded_serializes_camel_case() {
        let event = PageLoaded {
            current_offset: 25,
            total_count: Some(31),
            new_items: vec![],
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"currentOffset": 25, "totalCount": 31, "newItems": []})
        );
    }
}
