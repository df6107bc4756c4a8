//! Generic per-endpoint response cache.
//!
//! Maps a `QueryKey` to a cached entry with status, data, error, and
//! subscriber count. Concurrent identical requests coalesce into one fetch;
//! responses arriving for a superseded request are discarded; entries nobody
//! subscribes to are evicted after a grace period.
//!
//! No automatic retry anywhere: a `Failed` entry stays failed until a later
//! `request` call (parameter change or explicit invalidation).

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::ApiError;

use super::key::QueryKey;

/// How long an entry with zero subscribers survives before eviction.
/// Long enough to ride out a widget remount, short enough to reclaim
/// parameter combinations no longer in view.
const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Lifecycle of a cached response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Uninitialized,
    Pending,
    Resolved,
    Failed,
}

/// Snapshot of one cache entry as handed to subscribers.
#[derive(Debug)]
pub struct CacheEntry<T> {
    pub status: QueryStatus,
    pub data: Option<Arc<T>>,
    pub error: Option<Arc<ApiError>>,
}

// Manual impl: deriving Clone would require T: Clone, but the data is shared.
impl<T> Clone for CacheEntry<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
        }
    }
}

impl<T> CacheEntry<T> {
    fn uninitialized() -> Self {
        Self {
            status: QueryStatus::Uninitialized,
            data: None,
            error: None,
        }
    }

    fn pending() -> Self {
        Self {
            status: QueryStatus::Pending,
            data: None,
            error: None,
        }
    }

    fn resolved(data: Arc<T>) -> Self {
        Self {
            status: QueryStatus::Resolved,
            data: Some(data),
            error: None,
        }
    }

    fn failed(error: Arc<ApiError>) -> Self {
        Self {
            status: QueryStatus::Failed,
            data: None,
            error: Some(error),
        }
    }
}

struct EntryState<T> {
    snapshot: watch::Sender<CacheEntry<T>>,
    subscriber_count: usize,
    /// Epoch of the most recent request for this key. A completed fetch
    /// applies its result only if its captured epoch still matches; epochs
    /// are drawn from a cache-wide counter so an evicted-and-recreated entry
    /// never collides with a fetch started against its predecessor.
    epoch: u64,
    /// Bumped whenever the subscriber count changes; a grace-period timer
    /// evicts only if its captured generation still matches.
    idle_generation: u64,
}

impl<T> EntryState<T> {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(CacheEntry::uninitialized());
        Self {
            snapshot: tx,
            subscriber_count: 0,
            epoch: 0,
            idle_generation: 0,
        }
    }

    fn status(&self) -> QueryStatus {
        self.snapshot.borrow().status
    }
}

struct Inner<T> {
    entries: Mutex<HashMap<QueryKey, EntryState<T>>>,
    next_epoch: AtomicU64,
}

impl<T> Inner<T> {
    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, EntryState<T>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Generic query cache for one result type.
///
/// Cheap to clone; clones share the same entry map.
pub struct QueryCache<T: Send + Sync + 'static> {
    inner: Arc<Inner<T>>,
    grace_period: Duration,
}

impl<T: Send + Sync + 'static> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            grace_period: self.grace_period,
        }
    }
}

impl<T: Send + Sync + 'static> QueryCache<T> {
    pub fn new() -> Self {
        Self::with_grace_period(DEFAULT_GRACE_PERIOD)
    }

    pub fn with_grace_period(grace_period: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                next_epoch: AtomicU64::new(1),
            }),
            grace_period,
        }
    }

    /// Request the entry for `key`, fetching if necessary.
    ///
    /// A `Pending` or `Resolved` entry is returned unchanged: at most one
    /// fetch is in flight per key, shared across all subscribers. An absent,
    /// `Uninitialized`, or `Failed` entry transitions to `Pending` and the
    /// fetcher is spawned onto the runtime.
    pub fn request<F, Fut>(&self, key: &QueryKey, fetcher: F) -> CacheEntry<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let epoch = {
            let mut entries = self.inner.lock();
            let state = entries.entry(key.clone()).or_insert_with(EntryState::new);
            match state.status() {
                QueryStatus::Pending | QueryStatus::Resolved => {
                    return state.snapshot.borrow().clone();
                }
                QueryStatus::Uninitialized | QueryStatus::Failed => {}
            }
            let epoch = self.inner.next_epoch.fetch_add(1, Ordering::Relaxed);
            state.epoch = epoch;
            state.snapshot.send_replace(CacheEntry::pending());
            epoch
        };
        // The fetcher closure runs outside the lock; the Pending status set
        // above already dedups racing callers.
        debug!(key = %key, epoch, "starting fetch");
        let future = fetcher();
        let inner = Arc::clone(&self.inner);
        let key = key.clone();
        tokio::spawn(async move {
            let result = future.await;
            let mut entries = inner.lock();
            let Some(state) = entries.get_mut(&key) else {
                debug!(key = %key, epoch, "entry evicted while fetch in flight");
                return;
            };
            if state.epoch != epoch {
                debug!(key = %key, epoch, current = state.epoch, "stale response discarded");
                return;
            }
            match result {
                Ok(data) => {
                    debug!(key = %key, epoch, "fetch resolved");
                    state.snapshot.send_replace(CacheEntry::resolved(Arc::new(data)));
                }
                Err(err) => {
                    warn!(key = %key, epoch, error = %err, "fetch failed");
                    state.snapshot.send_replace(CacheEntry::failed(Arc::new(err)));
                }
            }
        });
        CacheEntry::pending()
    }

    /// Register interest in `key`, creating an `Uninitialized` entry if none
    /// exists. The handle observes every status transition; dropping it
    /// releases the entry for eventual eviction.
    pub fn subscribe(&self, key: &QueryKey) -> Subscription<T> {
        let mut entries = self.inner.lock();
        let state = entries.entry(key.clone()).or_insert_with(EntryState::new);
        state.subscriber_count += 1;
        state.idle_generation += 1;
        Subscription {
            key: key.clone(),
            receiver: state.snapshot.subscribe(),
            inner: Arc::clone(&self.inner),
            grace_period: self.grace_period,
        }
    }

    /// Force matching entries back to `Uninitialized`, discarding in-flight
    /// results, and notify subscribers. The next `request` refetches.
    pub fn invalidate(&self, predicate: impl Fn(&QueryKey) -> bool) {
        let mut entries = self.inner.lock();
        for (key, state) in entries.iter_mut() {
            if predicate(key) {
                debug!(key = %key, "invalidating entry");
                state.epoch = self.inner.next_epoch.fetch_add(1, Ordering::Relaxed);
                state.snapshot.send_replace(CacheEntry::uninitialized());
            }
        }
    }

    /// Current entry snapshot without side effects.
    pub fn peek(&self, key: &QueryKey) -> Option<CacheEntry<T>> {
        let entries = self.inner.lock();
        entries.get(key).map(|s| s.snapshot.borrow().clone())
    }

    /// Number of live entries, evicted or not yet created keys excluded.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl<T: Send + Sync + 'static> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Association between one consumer and one key. Owns no data; only a
/// reference used to track the subscriber count and receive notifications.
pub struct Subscription<T: Send + Sync + 'static> {
    key: QueryKey,
    receiver: watch::Receiver<CacheEntry<T>>,
    inner: Arc<Inner<T>>,
    grace_period: Duration,
}

impl<T: Send + Sync + 'static> Subscription<T> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Snapshot of the entry as of now.
    pub fn current(&self) -> CacheEntry<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next status transition. Returns `false` if the entry was
    /// evicted out from under the subscription.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }
}

impl<T: Send + Sync + 'static> Drop for Subscription<T> {
    fn drop(&mut self) {
        let mut entries = self.inner.lock();
        let Some(state) = entries.get_mut(&self.key) else {
            return;
        };
        state.subscriber_count = state.subscriber_count.saturating_sub(1);
        state.idle_generation += 1;
        if state.subscriber_count > 0 {
            return;
        }
        let generation = state.idle_generation;
        drop(entries);

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            // No runtime, no timer: reclaim immediately.
            let mut entries = self.inner.lock();
            if entries
                .get(&self.key)
                .is_some_and(|s| s.subscriber_count == 0 && s.idle_generation == generation)
            {
                entries.remove(&self.key);
            }
            return;
        };

        let inner = Arc::clone(&self.inner);
        let key = self.key.clone();
        let grace_period = self.grace_period;
        handle.spawn(async move {
            tokio::time::sleep(grace_period).await;
            let mut entries = inner.lock();
            let still_idle = entries
                .get(&key)
                .is_some_and(|s| s.subscriber_count == 0 && s.idle_generation == generation);
            if still_idle {
                debug!(key = %key, "evicting entry after grace period");
                entries.remove(&key);
            }
        });
    }
}
