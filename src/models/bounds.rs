//! Absolute date bounds discovered from the backend at startup.

use serde::{Deserialize, Serialize};

use crate::api::ApiError;

/// Payload of `fires/available-date-range`. Timestamps are in **seconds**;
/// the empty database case answers `{"message": ...}` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AvailableDateRange {
    Range { min_date: i64, max_date: i64 },
    Empty { message: String },
}

/// The absolute minimum/maximum selectable dates, in epoch milliseconds.
///
/// Fetched once at startup and read-only thereafter; constrains what the
/// user may pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsoluteBounds {
    pub min_ms: i64,
    pub max_ms: i64,
}

impl AvailableDateRange {
    /// Scale the second-based wire timestamps to the store's millisecond
    /// convention. An empty range is an `ApiError::EmptyRange`, surfaced as
    /// a distinct no-data condition rather than a crash downstream.
    pub fn into_bounds(self) -> Result<AbsoluteBounds, ApiError> {
        match self {
            AvailableDateRange::Range { min_date, max_date } => Ok(AbsoluteBounds {
                min_ms: min_date * 1000,
                max_ms: max_date * 1000,
            }),
            AvailableDateRange::Empty { .. } => Err(ApiError::EmptyRange),
        }
    }
}
