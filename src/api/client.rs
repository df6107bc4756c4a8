//! API client for the fires aggregation REST API.
//!
//! This module provides the `ApiClient` struct for fetching the aggregate
//! statistics the dashboard renders. All endpoints are unauthenticated GETs
//! under `{base_url}/api/`.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::models::{
    AvailableDateRange, DistrictCount, DurationBin, MonthlyCount, MostAffectedDistrict,
    TotalFires, WorstDayStats,
};
use crate::store::DateRangeParams;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default backend address; the original frontend reads it from the
/// environment, so `Config`/`FIREDASH_API_URL` override this.
const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// HTTP request timeout in seconds.
/// 30s allows for slow aggregate queries while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the fires backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client against the default backend address.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a specific backend address.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::build(base_url.into(), Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    /// Create a client from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::build(config.base_url(), config.request_timeout())
    }

    fn build(base_url: String, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn range_url(&self, path: &str, params: DateRangeParams) -> String {
        format!(
            "{}?fromDate={}&toDate={}",
            self.url(path),
            params.from_ms,
            params.to_ms
        )
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await?;
        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::Parse(format!("{} (from {})", e, url)))
    }

    // ===== Data Fetching Methods =====

    /// Fetch fire counts grouped per calendar month.
    pub async fn fetch_fires_per_month(
        &self,
        params: DateRangeParams,
    ) -> Result<Vec<MonthlyCount>, ApiError> {
        self.get(&self.range_url("fires/months", params)).await
    }

    /// Fetch the total fire count for the range.
    pub async fn fetch_total_fires(&self, params: DateRangeParams) -> Result<TotalFires, ApiError> {
        self.get(&self.range_url("fires/total", params)).await
    }

    /// Fetch the district with the most fires, if any.
    pub async fn fetch_most_affected_district(
        &self,
        params: DateRangeParams,
    ) -> Result<MostAffectedDistrict, ApiError> {
        self.get(&self.range_url("fires/most-affected-district", params))
            .await
    }

    /// Fetch per-district fire counts, most affected first.
    pub async fn fetch_count_per_district(
        &self,
        params: DateRangeParams,
    ) -> Result<Vec<DistrictCount>, ApiError> {
        self.get(&self.range_url("fires/count-per-district", params))
            .await
    }

    /// Fetch the fire-duration histogram bins.
    pub async fn fetch_duration_histogram(
        &self,
        params: DateRangeParams,
    ) -> Result<Vec<DurationBin>, ApiError> {
        self.get(&self.range_url("fires/duration-histogram", params))
            .await
    }

    /// Fetch aggregate statistics for the worst day in the range.
    pub async fn fetch_worst_day_stats(
        &self,
        params: DateRangeParams,
    ) -> Result<WorstDayStats, ApiError> {
        self.get(&self.range_url("fires/worst-day-stats", params))
            .await
    }

    /// Fetch the absolute selectable date range. Takes no date parameters;
    /// the response carries second-based timestamps (see
    /// `AvailableDateRange::into_bounds`).
    pub async fn fetch_available_date_range(&self) -> Result<AvailableDateRange, ApiError> {
        self.get(&self.url("fires/available-date-range")).await
    }
}
