//! firedash - data-synchronization layer for a wildfire statistics dashboard.
//!
//! Several independent visual widgets render aggregates from a remote fires
//! API, all filtered by one shared date range. This crate keeps them
//! consistent: a single date-range store every widget observes, a
//! per-endpoint query cache that coalesces identical requests and discards
//! out-of-order responses, and the bindings mapping cache entries to widget
//! display states. Rendering and layout are the embedder's concern.
//!
//! Typical startup:
//!
//! ```no_run
//! use firedash::{ApiClient, BoundsStatus, Dashboard};
//!
//! # async fn start() -> anyhow::Result<()> {
//! let client = ApiClient::new()?;
//! let mut dashboard = Dashboard::new(client);
//! match dashboard.load_bounds().await? {
//!     BoundsStatus::Ready(_) => dashboard.refresh_all(),
//!     BoundsStatus::NoData => { /* show the no-data notice */ }
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod query;
pub mod store;

pub use api::{ApiClient, ApiError};
pub use config::Config;
pub use dashboard::{BoundsStatus, Dashboard, FetchFn, QueryBinding, WidgetState};
pub use query::{CacheEntry, QueryCache, QueryKey, QueryStatus, Subscription};
pub use store::{
    DateRange, DateRangeParams, DateRangeSelectors, DateRangeStore, Readiness, TimestampMs,
};
