//! Shared date-range filter state.
//!
//! One `DateRangeStore` is shared by every widget on the page. All mutation
//! goes through named operations; consumers observe changes through a
//! `tokio::sync::watch` channel, so a bound edit fans out to every binding
//! whose parameter set depends on the range.

use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::watch;

use crate::models::AbsoluteBounds;

/// Epoch milliseconds, the store-wide timestamp convention.
pub type TimestampMs = i64;

/// The canonical filter: two nullable timestamps.
///
/// Starts as `(None, None)`, is populated once from the server-reported
/// absolute bounds, and afterwards changes only through user edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub min_ms: Option<TimestampMs>,
    pub max_ms: Option<TimestampMs>,
}

/// Query parameters derived from a fully specified range.
///
/// Serializes with the backend's query-parameter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRangeParams {
    #[serde(rename = "fromDate")]
    pub from_ms: TimestampMs,
    #[serde(rename = "toDate")]
    pub to_ms: TimestampMs,
}

/// Whether the filter can be turned into query parameters.
///
/// A first-class value instead of truthiness checks scattered per widget:
/// bindings must not fetch while `NotReady`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    NotReady,
    Ready(DateRangeParams),
}

impl DateRange {
    /// A range is queryable once both bounds are set and ordered.
    ///
    /// An inverted range (min > max) can occur mid-edit since the store does
    /// not cross-validate single-bound writes; it is treated as not ready
    /// rather than rejected, so no query is ever issued with from > to.
    pub fn readiness(&self) -> Readiness {
        match (self.min_ms, self.max_ms) {
            (Some(from), Some(to)) if from <= to => Readiness::Ready(DateRangeParams {
                from_ms: from,
                to_ms: to,
            }),
            _ => Readiness::NotReady,
        }
    }
}

/// Shared mutable filter, the single writer for the two timestamp fields.
pub struct DateRangeStore {
    range: watch::Sender<DateRange>,
    bounds: Mutex<Option<AbsoluteBounds>>,
}

impl DateRangeStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(DateRange::default());
        Self {
            range: tx,
            bounds: Mutex::new(None),
        }
    }

    /// Replace the lower bound. No cross-validation against the upper bound;
    /// ordering is enforced at the readiness boundary.
    pub fn set_min(&self, ts: Option<TimestampMs>) {
        self.range.send_if_modified(|r| {
            let changed = r.min_ms != ts;
            r.min_ms = ts;
            changed
        });
    }

    /// Replace the upper bound.
    pub fn set_max(&self, ts: Option<TimestampMs>) {
        self.range.send_if_modified(|r| {
            let changed = r.max_ms != ts;
            r.max_ms = ts;
            changed
        });
    }

    /// Atomic dual update, used once at startup after the absolute bounds
    /// are known. Also records the bounds for pickers to constrain against.
    pub fn set_bounds(&self, bounds: AbsoluteBounds) {
        *self.lock_bounds() = Some(bounds);
        self.range.send_if_modified(|r| {
            let next = DateRange {
                min_ms: Some(bounds.min_ms),
                max_ms: Some(bounds.max_ms),
            };
            let changed = *r != next;
            *r = next;
            changed
        });
    }

    /// The stored nullable lower bound, unchanged. Fetch paths use this and
    /// treat `None` as not yet ready.
    pub fn raw_min(&self) -> Option<TimestampMs> {
        self.range.borrow().min_ms
    }

    /// The stored nullable upper bound, unchanged.
    pub fn raw_max(&self) -> Option<TimestampMs> {
        self.range.borrow().max_ms
    }

    /// Snapshot of the whole filter.
    pub fn current(&self) -> DateRange {
        *self.range.borrow()
    }

    /// Observe every filter change.
    pub fn subscribe(&self) -> watch::Receiver<DateRange> {
        self.range.subscribe()
    }

    /// The absolute selectable bounds, once discovered.
    pub fn bounds(&self) -> Option<AbsoluteBounds> {
        *self.lock_bounds()
    }

    fn lock_bounds(&self) -> std::sync::MutexGuard<'_, Option<AbsoluteBounds>> {
        self.bounds.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for DateRangeStore {
    fn default() -> Self {
        Self::new()
    }
}
