//! Glue between one widget and the data layer.
//!
//! A binding declares an endpoint, derives its parameter set from the shared
//! date-range filter, and projects the cache entry into a widget display
//! state. It owns no caching logic: requesting, dedup, and staleness all
//! live in the query cache.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::watch;
use tracing::warn;

use crate::api::ApiError;
use crate::query::{QueryCache, QueryKey, QueryStatus, Subscription};
use crate::store::{DateRange, DateRangeParams, DateRangeSelectors, DateRangeStore, Readiness};

/// Fetch function bound to one endpoint, invoked by the cache on a miss.
pub type FetchFn<T> =
    Arc<dyn Fn(DateRangeParams) -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync>;

/// What a widget renders.
///
/// `AwaitingInput` (filter not ready, nothing requested) is distinct from
/// `Loading` (request in flight) and from `Failed` (request completed with
/// an error).
#[derive(Debug)]
pub enum WidgetState<T> {
    AwaitingInput,
    Loading,
    Ready(Arc<T>),
    Failed(Arc<ApiError>),
}

impl<T> Clone for WidgetState<T> {
    fn clone(&self) -> Self {
        match self {
            WidgetState::AwaitingInput => WidgetState::AwaitingInput,
            WidgetState::Loading => WidgetState::Loading,
            WidgetState::Ready(data) => WidgetState::Ready(Arc::clone(data)),
            WidgetState::Failed(err) => WidgetState::Failed(Arc::clone(err)),
        }
    }
}

impl<T> WidgetState<T> {
    pub fn is_awaiting_input(&self) -> bool {
        matches!(self, WidgetState::AwaitingInput)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, WidgetState::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, WidgetState::Failed(_))
    }

    pub fn data(&self) -> Option<&Arc<T>> {
        match self {
            WidgetState::Ready(data) => Some(data),
            _ => None,
        }
    }
}

/// Binding between one widget and one endpoint.
pub struct QueryBinding<T: Send + Sync + 'static> {
    endpoint: &'static str,
    cache: QueryCache<T>,
    store_rx: watch::Receiver<DateRange>,
    selectors: Arc<DateRangeSelectors>,
    fetch: FetchFn<T>,
    subscription: Option<Subscription<T>>,
}

impl<T: Send + Sync + 'static> QueryBinding<T> {
    pub fn new(
        endpoint: &'static str,
        cache: QueryCache<T>,
        store: &DateRangeStore,
        selectors: Arc<DateRangeSelectors>,
        fetch: FetchFn<T>,
    ) -> Self {
        Self {
            endpoint,
            cache,
            store_rx: store.subscribe(),
            selectors,
            fetch,
            subscription: None,
        }
    }

    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    /// Re-derive the parameter set and (re)issue the request.
    ///
    /// Called on mount and after every store or cache notification. While
    /// the filter is not ready, no request is made and any previous
    /// subscription is released so its entry can age out. When the derived
    /// key changes, the old subscription is swapped for the new one.
    ///
    /// A `Failed` entry under an unchanged key is left alone: refresh runs
    /// on every notification, so requesting unconditionally would retry a
    /// failure in a loop. Recovery happens only through a parameter change
    /// or an invalidation resetting the entry to `Uninitialized`.
    pub fn refresh(&mut self) {
        let range = *self.store_rx.borrow_and_update();
        match *self.selectors.readiness(&range) {
            Readiness::NotReady => {
                self.subscription = None;
            }
            Readiness::Ready(params) => {
                let key = match QueryKey::new(self.endpoint, &params) {
                    Ok(key) => key,
                    Err(e) => {
                        warn!(endpoint = self.endpoint, error = %e, "could not build query key");
                        self.subscription = None;
                        return;
                    }
                };
                let key_changed = self.subscription.as_ref().is_none_or(|s| s.key() != &key);
                if key_changed {
                    self.subscription = Some(self.cache.subscribe(&key));
                }
                let status = self.subscription.as_ref().map(|s| s.current().status);
                if key_changed || status == Some(QueryStatus::Uninitialized) {
                    let fetch = Arc::clone(&self.fetch);
                    self.cache.request(&key, move || fetch(params));
                }
            }
        }
    }

    /// Project the current cache entry into a display state.
    pub fn state(&self) -> WidgetState<T> {
        let Some(sub) = &self.subscription else {
            return WidgetState::AwaitingInput;
        };
        let entry = sub.current();
        match entry.status {
            QueryStatus::Uninitialized | QueryStatus::Pending => WidgetState::Loading,
            QueryStatus::Resolved => match entry.data {
                Some(data) => WidgetState::Ready(data),
                None => WidgetState::Loading,
            },
            QueryStatus::Failed => match entry.error {
                Some(err) => WidgetState::Failed(err),
                None => WidgetState::Loading,
            },
        }
    }

    /// Wait until either the filter or this binding's cache entry changes.
    pub async fn changed(&mut self) {
        match self.subscription.as_mut() {
            Some(sub) => {
                tokio::select! {
                    _ = self.store_rx.changed() => {}
                    _ = sub.changed() => {}
                }
            }
            None => {
                let _ = self.store_rx.changed().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    fn counting_fetch(
        calls: &Arc<AtomicUsize>,
        value: &str,
    ) -> FetchFn<String> {
        let calls = Arc::clone(calls);
        let value = value.to_string();
        Arc::new(move |_params| {
            calls.fetch_add(1, Ordering::SeqCst);
            let value = value.clone();
            Box::pin(async move { Ok(value) })
        })
    }

    fn binding_with(
        store: &DateRangeStore,
        fetch: FetchFn<String>,
    ) -> (QueryBinding<String>, QueryCache<String>) {
        let cache: QueryCache<String> = QueryCache::new();
        let binding = QueryBinding::new(
            "fires/total",
            cache.clone(),
            store,
            Arc::new(DateRangeSelectors::new()),
            fetch,
        );
        (binding, cache)
    }

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_skip_while_bounds_unset() {
        let store = DateRangeStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (mut binding, cache) = binding_with(&store, counting_fetch(&calls, "42"));

        binding.refresh();
        assert!(binding.state().is_awaiting_input());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(cache.is_empty());

        // One bound alone is still not ready.
        store.set_min(Some(1_685_000_000_000));
        binding.refresh();
        assert!(binding.state().is_awaiting_input());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ready_range_fetches_and_resolves() {
        let store = DateRangeStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (mut binding, _cache) = binding_with(&store, counting_fetch(&calls, "42"));

        store.set_min(Some(1_685_000_000_000));
        store.set_max(Some(1_686_000_000_000));
        binding.refresh();
        assert!(binding.state().is_loading());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        settle().await;
        let state = binding.state();
        assert_eq!(state.data().map(|d| d.as_str()), Some("42"));
    }

    #[tokio::test]
    async fn test_key_swap_on_range_move() {
        let store = DateRangeStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (mut binding, cache) = binding_with(&store, counting_fetch(&calls, "42"));

        store.set_min(Some(100));
        store.set_max(Some(200));
        binding.refresh();
        settle().await;

        store.set_max(Some(300));
        binding.refresh();
        settle().await;

        // Two distinct keys fetched, both entries alive until the old one's
        // grace period expires.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_entry_not_retried_without_parameter_change() {
        let store = DateRangeStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch: FetchFn<String> = {
            let calls = Arc::clone(&calls);
            Arc::new(move |_params| {
                calls.fetch_add(1, Ordering::SeqCst);
                Box::pin(async { Err(ApiError::Parse("unexpected shape".into())) })
            })
        };
        let (mut binding, cache) = binding_with(&store, fetch);

        store.set_min(Some(100));
        store.set_max(Some(200));
        binding.refresh();
        settle().await;
        assert!(binding.state().is_failed());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Further notifications with unchanged params must not retry.
        binding.refresh();
        binding.refresh();
        settle().await;
        assert!(binding.state().is_failed());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // A parameter change does refetch.
        store.set_max(Some(300));
        binding.refresh();
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // So does invalidation: the entry resets and the same key refetches.
        cache.invalidate(|_| true);
        binding.refresh();
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failure_surfaces_as_failed_state() {
        let store = DateRangeStore::new();
        let fetch: FetchFn<String> = Arc::new(|_params| {
            Box::pin(async { Err(ApiError::Parse("unexpected shape".into())) })
        });
        let (mut binding, _cache) = binding_with(&store, fetch);

        store.set_min(Some(100));
        store.set_max(Some(200));
        binding.refresh();
        settle().await;

        assert!(binding.state().is_failed());
    }

    #[tokio::test]
    async fn test_changed_wakes_on_resolution() {
        let store = DateRangeStore::new();
        let (tx, rx) = oneshot::channel::<()>();
        let fetch: FetchFn<String> = {
            let rx = std::sync::Mutex::new(Some(rx));
            Arc::new(move |_params| {
                let rx = rx.lock().unwrap().take();
                Box::pin(async move {
                    if let Some(rx) = rx {
                        let _ = rx.await;
                    }
                    Ok("done".to_string())
                })
            })
        };
        let (mut binding, _cache) = binding_with(&store, fetch);

        store.set_min(Some(100));
        store.set_max(Some(200));
        binding.refresh();
        assert!(binding.state().is_loading());

        tx.send(()).unwrap();
        // The first wakeup may be the Pending transition; wait until data.
        loop {
            binding.changed().await;
            if let Some(data) = binding.state().data() {
                assert_eq!(data.as_str(), "done");
                break;
            }
        }
    }
}
