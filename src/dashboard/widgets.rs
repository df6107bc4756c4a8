//! The dashboard's widget set and its wiring.
//!
//! One binding per aggregate endpoint, all sharing the same date-range store
//! so a single filter edit fans out to every widget. Rendering itself is the
//! embedder's concern; this module only maintains the display states.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::api::{ApiClient, ApiError};
use crate::config::Config;
use crate::models::{
    AbsoluteBounds, DistrictCount, DurationBin, MonthlyCount, MostAffectedDistrict, TotalFires,
    WorstDayStats,
};
use crate::query::QueryCache;
use crate::store::{DateRangeSelectors, DateRangeStore};

use super::binding::{FetchFn, QueryBinding};

/// Endpoint identifiers, also the endpoint half of each query key.
pub mod endpoints {
    pub const FIRES_PER_MONTH: &str = "fires/months";
    pub const TOTAL_FIRES: &str = "fires/total";
    pub const MOST_AFFECTED_DISTRICT: &str = "fires/most-affected-district";
    pub const COUNT_PER_DISTRICT: &str = "fires/count-per-district";
    pub const DURATION_HISTOGRAM: &str = "fires/duration-histogram";
    pub const WORST_DAY_STATS: &str = "fires/worst-day-stats";
}

/// Outcome of the startup bounds discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsStatus {
    Ready(AbsoluteBounds),
    /// The backend has no data at all. The store stays unset and widgets
    /// keep reporting `AwaitingInput`; the embedder should show a
    /// "no data available" notice instead of the filter.
    NoData,
}

/// All six widgets plus the shared store and selectors.
pub struct Dashboard {
    store: Arc<DateRangeStore>,
    selectors: Arc<DateRangeSelectors>,
    client: ApiClient,
    pub fires_per_month: QueryBinding<Vec<MonthlyCount>>,
    pub total_fires: QueryBinding<TotalFires>,
    pub most_affected_district: QueryBinding<MostAffectedDistrict>,
    pub count_per_district: QueryBinding<Vec<DistrictCount>>,
    pub duration_histogram: QueryBinding<Vec<DurationBin>>,
    pub worst_day: QueryBinding<WorstDayStats>,
}

impl Dashboard {
    pub fn new(client: ApiClient) -> Self {
        Self::build(client, None)
    }

    pub fn with_grace_period(client: ApiClient, grace_period: Duration) -> Self {
        Self::build(client, Some(grace_period))
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let client = ApiClient::from_config(config)?;
        Ok(Self::build(client, Some(config.grace_period())))
    }

    fn build(client: ApiClient, grace_period: Option<Duration>) -> Self {
        let store = Arc::new(DateRangeStore::new());
        let selectors = Arc::new(DateRangeSelectors::new());

        let fires_per_month = Self::bind(
            endpoints::FIRES_PER_MONTH,
            &client,
            grace_period,
            &store,
            &selectors,
            |client, params| async move { client.fetch_fires_per_month(params).await },
        );
        let total_fires = Self::bind(
            endpoints::TOTAL_FIRES,
            &client,
            grace_period,
            &store,
            &selectors,
            |client, params| async move { client.fetch_total_fires(params).await },
        );
        let most_affected_district = Self::bind(
            endpoints::MOST_AFFECTED_DISTRICT,
            &client,
            grace_period,
            &store,
            &selectors,
            |client, params| async move { client.fetch_most_affected_district(params).await },
        );
        let count_per_district = Self::bind(
            endpoints::COUNT_PER_DISTRICT,
            &client,
            grace_period,
            &store,
            &selectors,
            |client, params| async move { client.fetch_count_per_district(params).await },
        );
        let duration_histogram = Self::bind(
            endpoints::DURATION_HISTOGRAM,
            &client,
            grace_period,
            &store,
            &selectors,
            |client, params| async move { client.fetch_duration_histogram(params).await },
        );
        let worst_day = Self::bind(
            endpoints::WORST_DAY_STATS,
            &client,
            grace_period,
            &store,
            &selectors,
            |client, params| async move { client.fetch_worst_day_stats(params).await },
        );

        Self {
            store,
            selectors,
            client,
            fires_per_month,
            total_fires,
            most_affected_district,
            count_per_district,
            duration_histogram,
            worst_day,
        }
    }

    /// Wire one endpoint to its own cache, sharing the store and selectors.
    fn bind<T, F, Fut>(
        endpoint: &'static str,
        client: &ApiClient,
        grace_period: Option<Duration>,
        store: &Arc<DateRangeStore>,
        selectors: &Arc<DateRangeSelectors>,
        fetch: F,
    ) -> QueryBinding<T>
    where
        T: Send + Sync + 'static,
        F: Fn(ApiClient, crate::store::DateRangeParams) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let cache = match grace_period {
            Some(grace) => QueryCache::with_grace_period(grace),
            None => QueryCache::new(),
        };
        let client = client.clone();
        let fetch: FetchFn<T> = Arc::new(move |params| Box::pin(fetch(client.clone(), params)));
        QueryBinding::new(endpoint, cache, store, Arc::clone(selectors), fetch)
    }

    pub fn store(&self) -> &DateRangeStore {
        &self.store
    }

    pub fn selectors(&self) -> &DateRangeSelectors {
        &self.selectors
    }

    /// Discover the absolute selectable bounds and seed the filter.
    ///
    /// Called once at startup. An empty backend leaves the store unset and
    /// returns `BoundsStatus::NoData` rather than an error, so downstream
    /// widgets keep their defined awaiting state.
    pub async fn load_bounds(&self) -> Result<BoundsStatus, ApiError> {
        let range = self.client.fetch_available_date_range().await?;
        match range.into_bounds() {
            Ok(bounds) => {
                info!(min_ms = bounds.min_ms, max_ms = bounds.max_ms, "date bounds discovered");
                self.store.set_bounds(bounds);
                Ok(BoundsStatus::Ready(bounds))
            }
            Err(ApiError::EmptyRange) => {
                info!("backend reports no available date range");
                Ok(BoundsStatus::NoData)
            }
            Err(e) => Err(e),
        }
    }

    /// Re-derive every widget's parameters against the current filter.
    /// Called on mount and after each store or cache notification.
    pub fn refresh_all(&mut self) {
        self.fires_per_month.refresh();
        self.total_fires.refresh();
        self.most_affected_district.refresh();
        self.count_per_district.refresh();
        self.duration_histogram.refresh();
        self.worst_day.refresh();
    }
}
