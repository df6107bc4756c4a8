//! Shared filter state and its derived selectors.
//!
//! The `DateRangeStore` holds the canonical date filter every widget depends
//! on; `DateRangeSelectors` provides the memoized, display-ready projections
//! of that state.

pub mod date_range;
pub mod selectors;

pub use date_range::{DateRange, DateRangeParams, DateRangeStore, Readiness, TimestampMs};
pub use selectors::{DateRangeSelectors, Memo};
