//! Parameterized query cache.
//!
//! The cache is the synchronization point between widgets and the network:
//! it deduplicates concurrent identical requests, sequences out-of-order
//! responses via per-request epochs, and reclaims entries nobody watches.

pub mod cache;
pub mod key;

pub use cache::{CacheEntry, QueryCache, QueryStatus, Subscription};
pub use key::QueryKey;
