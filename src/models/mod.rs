//! Data models for the fires aggregation API.
//!
//! This module contains the response structures for every endpoint the
//! dashboard consumes:
//!
//! - `MonthlyCount`: fires grouped per calendar month
//! - `TotalFires`, `MostAffectedDistrict`: single-value metrics
//! - `DistrictCount`, `DurationBin`: per-district and histogram series
//! - `WorstDayStats`: aggregate statistics for the worst day
//! - `AvailableDateRange`, `AbsoluteBounds`: selectable date bounds

pub mod bounds;
pub mod fires;

pub use bounds::{AbsoluteBounds, AvailableDateRange};
pub use fires::{
    DistrictCount, DurationBin, MonthlyCount, MostAffectedDistrict, ResourceTotals, TotalFires,
    WorstDay, WorstDayStats,
};
