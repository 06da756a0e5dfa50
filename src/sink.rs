//! Result sinks
//!
//! A sink owns the growable, ordered collection that accumulates records across
//! pages, plus the flag telling the view that there is nothing left to load.

use crate::types::Record;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Receives records from the cursor
///
/// Methods take `&self`; implementations provide their own interior
/// mutability so the caller can keep reading while the cursor is shared.
///
/// The cursor never holds its own lock while calling into the sink, so an
/// implementation may read cursor accessors such as `current_offset`.
pub trait ResultSink: Send + Sync {
    /// Append a page of records, preserving order
    fn append(&self, items: &[Record]);

    /// Set the exhausted flag
    fn set_exhausted(&self, exhausted: bool);

    /// Drop every record, called when a new session replaces the old one
    fn clear(&self);
}

impl<T: ResultSink + ?Sized> ResultSink for Arc<T> {
    fn append(&self, items: &[Record]) {
        (**self).append(items);
    }

    fn clear(&self) {
        (**self).clear();
    }

    fn set_exhausted(&self, exhausted: bool) {
        (**self).set_exhausted(exhausted);
    }
}

#[derive(Debug, Default)]
struct CollectionInner {
    items: Vec<Record>,
    exhausted: bool,
}

/// Shared record collection
///
/// Clones share the same storage, so one handle can be given to the cursor
/// while another is kept for rendering.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    inner: Arc<RwLock<CollectionInner>>,
}

impl Collection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records collected
    pub fn len(&self) -> usize {
        self.read().items.len()
    }

    /// Check if no records have been collected
    pub fn is_empty(&self) -> bool {
        self.read().items.is_empty()
    }

    /// Snapshot of the collected records
    pub fn items(&self) -> Vec<Record> {
        self.read().items.clone()
    }

    /// Run `f` against the collected records without cloning them
    pub fn with_items<R>(&self, f: impl FnOnce(&[Record]) -> R) -> R {
        f(&self.read().items)
    }

    /// Whether the cursor reported that no more pages exist
    pub fn is_exhausted(&self) -> bool {
        self.read().exhausted
    }

    /// Remove and return every collected record
    pub fn drain(&self) -> Vec<Record> {
        std::mem::take(&mut self.write().items)
    }

    fn read(&self) -> RwLockReadGuard<'_, CollectionInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CollectionInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResultSink for Collection {
    fn append(&self, items: &[Record]) {
        self.write().items.extend_from_slice(items);
    }

    fn set_exhausted(&self, exhausted: bool) {
        self.write().exhausted = exhausted;
    }

    fn clear(&self) {
        self.write().items.clear();
    }
}
