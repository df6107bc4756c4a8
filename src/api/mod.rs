//! REST client for the fires aggregation service.
//!
//! This module provides the `ApiClient` for fetching aggregate wildfire
//! statistics and the `ApiError` taxonomy shared with the query cache.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
