//! Memoized projections of store state.
//!
//! Consumers compare selector outputs by reference to decide whether to
//! re-render, so an unchanged input must return the identical `Arc`. The
//! derived selectors consume the raw selectors' outputs rather than store
//! internals, keeping derivation logic in one place.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::date_range::{DateRange, Readiness, TimestampMs};

/// Single-slot memo keyed by input equality.
///
/// Holds the last `(input, output)` pair; a call with an equal input returns
/// a clone of the cached `Arc`, so `Arc::ptr_eq` holds across calls.
pub struct Memo<I, O> {
    slot: Mutex<Option<(I, Arc<O>)>>,
}

impl<I: PartialEq + Clone, O> Memo<I, O> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    pub fn get(&self, input: I, compute: impl FnOnce(&I) -> O) -> Arc<O> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((last, out)) = slot.as_ref() {
            if *last == input {
                return Arc::clone(out);
            }
        }
        let out = Arc::new(compute(&input));
        *slot = Some((input, Arc::clone(&out)));
        out
    }
}

impl<I: PartialEq + Clone, O> Default for Memo<I, O> {
    fn default() -> Self {
        Self::new()
    }
}

/// The derived selectors over a `DateRange`.
#[derive(Default)]
pub struct DateRangeSelectors {
    effective_min: Memo<Option<TimestampMs>, DateTime<Utc>>,
    effective_max: Memo<Option<TimestampMs>, DateTime<Utc>>,
    readiness: Memo<DateRange, Readiness>,
}

impl DateRangeSelectors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concrete lower date, substituting the current wall clock when the raw
    /// bound is unset. Display fallback only: fetch paths use the raw
    /// selectors and treat `None` as not yet ready.
    pub fn effective_min(&self, range: &DateRange) -> Arc<DateTime<Utc>> {
        self.effective_min.get(range.min_ms, Self::to_effective)
    }

    /// Concrete upper date, same fallback as `effective_min`.
    pub fn effective_max(&self, range: &DateRange) -> Arc<DateTime<Utc>> {
        self.effective_max.get(range.max_ms, Self::to_effective)
    }

    /// Composes over the raw-bound readiness derivation; memoized so that
    /// bindings holding the previous `Arc` can skip re-deriving parameters.
    pub fn readiness(&self, range: &DateRange) -> Arc<Readiness> {
        self.readiness.get(*range, |r| r.readiness())
    }

    fn to_effective(raw: &Option<TimestampMs>) -> DateTime<Utc> {
        raw.and_then(DateTime::from_timestamp_millis)
            .unwrap_or_else(Utc::now)
    }
}
