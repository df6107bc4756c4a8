//! End-to-end flow over the public API: bounds discovery seeds the store,
//! widgets derive parameters, the cache resolves, and filter edits supersede
//! in-flight results. Fetchers are injected so no network is involved.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

use firedash::{
    ApiError, DateRangeParams, DateRangeSelectors, DateRangeStore, FetchFn, QueryBinding,
    QueryCache,
};
use firedash::models::{AvailableDateRange, MostAffectedDistrict, TotalFires};

async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

fn binding<T: Send + Sync + 'static>(
    endpoint: &'static str,
    store: &DateRangeStore,
    fetch: FetchFn<T>,
) -> QueryBinding<T> {
    QueryBinding::new(
        endpoint,
        QueryCache::with_grace_period(Duration::from_secs(60)),
        store,
        Arc::new(DateRangeSelectors::new()),
        fetch,
    )
}

#[tokio::test]
async fn bounds_seed_store_and_total_fires_resolves() {
    // Startup: the bounds endpoint answers in seconds.
    let payload: AvailableDateRange =
        serde_json::from_str(r#"{"min_date": 1680000000, "max_date": 1690000000}"#).unwrap();
    let store = DateRangeStore::new();
    store.set_bounds(payload.into_bounds().unwrap());
    assert_eq!(store.raw_min(), Some(1_680_000_000_000));
    assert_eq!(store.raw_max(), Some(1_690_000_000_000));

    // User narrows the range; the widget fetches with millisecond params.
    store.set_min(Some(1_685_000_000_000));
    store.set_max(Some(1_686_000_000_000));

    let seen_params: Arc<Mutex<Option<DateRangeParams>>> = Arc::new(Mutex::new(None));
    let fetch: FetchFn<TotalFires> = {
        let seen_params = Arc::clone(&seen_params);
        Arc::new(move |params| {
            *seen_params.lock().unwrap() = Some(params);
            Box::pin(async move {
                Ok(serde_json::from_str::<TotalFires>(r#"{"value": "42"}"#)
                    .map_err(|e| ApiError::Parse(e.to_string()))?)
            })
        })
    };

    let mut total_fires = binding("fires/total", &store, fetch);
    total_fires.refresh();
    settle().await;

    let params = seen_params.lock().unwrap().expect("fetch was issued");
    assert_eq!(params.from_ms, 1_685_000_000_000);
    assert_eq!(params.to_ms, 1_686_000_000_000);

    let state = total_fires.state();
    assert_eq!(state.data().map(|d| d.value.as_str()), Some("42"));
}

#[tokio::test]
async fn most_affected_none_is_no_data_not_error() {
    let store = DateRangeStore::new();
    store.set_min(Some(100));
    store.set_max(Some(200));

    let fetch: FetchFn<MostAffectedDistrict> = Arc::new(|_params| {
        Box::pin(async {
            serde_json::from_str::<MostAffectedDistrict>(r#"{"value": "None"}"#)
                .map_err(|e| ApiError::Parse(e.to_string()))
        })
    });

    let mut widget = binding("fires/most-affected-district", &store, fetch);
    widget.refresh();
    settle().await;

    let state = widget.state();
    assert!(!state.is_failed());
    let data = state.data().expect("resolved");
    assert!(data.is_no_data());
}

#[tokio::test]
async fn rejected_fetch_shows_failure_state() {
    let store = DateRangeStore::new();
    store.set_min(Some(100));
    store.set_max(Some(200));

    let fetch: FetchFn<Vec<firedash::models::DurationBin>> = Arc::new(|_params| {
        Box::pin(async {
            Err(ApiError::Server {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".into(),
            })
        })
    });

    let mut widget = binding("fires/duration-histogram", &store, fetch);
    widget.refresh();
    settle().await;

    assert!(widget.state().is_failed());
    assert!(widget.state().data().is_none());
}

#[tokio::test]
async fn dragging_the_range_shows_only_the_latest_result() {
    let store = DateRangeStore::new();

    // Gate each parameter set's response on a oneshot keyed by from_ms.
    type Gate = oneshot::Receiver<Result<String, ApiError>>;
    let gates: Arc<Mutex<HashMap<i64, Gate>>> = Arc::new(Mutex::new(HashMap::new()));
    let (tx_first, rx_first) = oneshot::channel();
    let (tx_second, rx_second) = oneshot::channel();
    gates.lock().unwrap().insert(100, rx_first);
    gates.lock().unwrap().insert(200, rx_second);

    let fetch: FetchFn<String> = {
        let gates = Arc::clone(&gates);
        Arc::new(move |params| {
            let gate = gates.lock().unwrap().remove(&params.from_ms);
            Box::pin(async move {
                match gate {
                    Some(rx) => rx.await.unwrap_or(Err(ApiError::EmptyRange)),
                    None => Ok("ungated".to_string()),
                }
            })
        })
    };

    let mut widget = binding("fires/months", &store, fetch);

    // First position of the drag: fetch starts, nothing resolves yet.
    store.set_min(Some(100));
    store.set_max(Some(1000));
    widget.refresh();
    assert!(widget.state().is_loading());

    // User keeps dragging before the response arrives.
    store.set_min(Some(200));
    widget.refresh();
    assert!(widget.state().is_loading());

    // The newer request resolves first.
    tx_second.send(Ok("second".to_string())).unwrap();
    settle().await;
    assert_eq!(widget.state().data().map(|d| d.as_str()), Some("second"));

    // The older response arrives late; the widget must not regress to it.
    tx_first.send(Ok("first".to_string())).unwrap();
    settle().await;
    assert_eq!(widget.state().data().map(|d| d.as_str()), Some("second"));
}
