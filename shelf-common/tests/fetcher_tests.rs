//! Rate-limited fetcher behaviour against a local HTTP server
//!
//! Each test spins up an axum server on an ephemeral port whose handler
//! scripts the upstream behaviour (429 bursts, errors, slow responses).

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use shelf_common::config::FetcherConfig;
use shelf_common::fetcher::fetch_json;
use shelf_common::{ByteSource, Error, RateLimitedFetcher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Clone, Default)]
struct Upstream {
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Fast config for tests: no spacing, short retry delay
fn quick_config() -> FetcherConfig {
    FetcherConfig {
        max_concurrent: 3,
        min_spacing_ms: 0,
        timeout_ms: 2_000,
        max_retries: 3,
        retry_delay_ms: 10,
    }
}

async fn twice_rate_limited(State(up): State<Upstream>) -> (StatusCode, &'static str) {
    let n = up.calls.fetch_add(1, Ordering::SeqCst);
    if n < 2 {
        (StatusCode::TOO_MANY_REQUESTS, "slow down")
    } else {
        (StatusCode::OK, "payload")
    }
}

async fn always_rate_limited(State(up): State<Upstream>) -> StatusCode {
    up.calls.fetch_add(1, Ordering::SeqCst);
    StatusCode::TOO_MANY_REQUESTS
}

async fn server_error(State(up): State<Upstream>) -> StatusCode {
    up.calls.fetch_add(1, Ordering::SeqCst);
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn slow(State(up): State<Upstream>) -> &'static str {
    up.calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(500)).await;
    "late"
}

async fn tracked(State(up): State<Upstream>) -> &'static str {
    up.arrivals.lock().unwrap().push(Instant::now());
    let now = up.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    up.max_in_flight.fetch_max(now, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;
    up.in_flight.fetch_sub(1, Ordering::SeqCst);
    "ok"
}

async fn json_body() -> &'static str {
    r#"{"title":"Dune"}"#
}

fn router(up: &Upstream) -> Router {
    Router::new()
        .route("/twice-429", get(twice_rate_limited))
        .route("/always-429", get(always_rate_limited))
        .route("/500", get(server_error))
        .route("/slow", get(slow))
        .route("/tracked", get(tracked))
        .route("/json", get(json_body))
        .with_state(up.clone())
}

#[tokio::test]
async fn test_retries_on_429_then_succeeds() {
    let up = Upstream::default();
    let base = spawn(router(&up)).await;
    let fetcher = RateLimitedFetcher::new("test", &quick_config()).unwrap();

    let body = fetcher.fetch(&format!("{}/twice-429", base)).await.unwrap();

    assert_eq!(body, b"payload");
    assert_eq!(up.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_429_retries_are_bounded() {
    let up = Upstream::default();
    let base = spawn(router(&up)).await;
    let config = FetcherConfig {
        max_retries: 2,
        ..quick_config()
    };
    let fetcher = RateLimitedFetcher::new("test", &config).unwrap();

    let err = fetcher.fetch(&format!("{}/always-429", base)).await.unwrap_err();

    assert!(matches!(err, Error::Upstream { status: Some(429), .. }), "got {:?}", err);
    // First attempt plus two retries
    assert_eq!(up.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_other_errors_are_not_retried() {
    let up = Upstream::default();
    let base = spawn(router(&up)).await;
    let fetcher = RateLimitedFetcher::new("test", &quick_config()).unwrap();

    let err = fetcher.fetch(&format!("{}/500", base)).await.unwrap_err();

    assert!(matches!(err, Error::Upstream { status: Some(500), .. }), "got {:?}", err);
    assert_eq!(up.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_timeout() {
    let up = Upstream::default();
    let base = spawn(router(&up)).await;
    let config = FetcherConfig {
        timeout_ms: 100,
        ..quick_config()
    };
    let fetcher = RateLimitedFetcher::new("test", &config).unwrap();

    let started = Instant::now();
    let err = fetcher.fetch(&format!("{}/slow", base)).await.unwrap_err();

    assert!(matches!(err, Error::Timeout { .. }), "got {:?}", err);
    assert!(started.elapsed() < Duration::from_millis(450));
    assert_eq!(up.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrency_ceiling_is_shared() {
    let up = Upstream::default();
    let base = spawn(router(&up)).await;
    let fetcher = Arc::new(RateLimitedFetcher::new("test", &quick_config()).unwrap());
    let url = format!("{}/tracked", base);

    let calls: Vec<_> = (0..8)
        .map(|_| {
            let fetcher = Arc::clone(&fetcher);
            let url = url.clone();
            tokio::spawn(async move { fetcher.fetch(&url).await })
        })
        .collect();
    for call in calls {
        call.await.unwrap().unwrap();
    }

    let max = up.max_in_flight.load(Ordering::SeqCst);
    assert!(max <= 3, "at most 3 calls in flight, saw {}", max);
    assert!(max >= 2, "calls should overlap, saw {}", max);
}

#[tokio::test]
async fn test_minimum_spacing_between_dispatches() {
    let up = Upstream::default();
    let base = spawn(router(&up)).await;
    let config = FetcherConfig {
        min_spacing_ms: 200,
        ..quick_config()
    };
    let fetcher = Arc::new(RateLimitedFetcher::new("test", &config).unwrap());
    let url = format!("{}/tracked", base);

    let calls: Vec<_> = (0..3)
        .map(|_| {
            let fetcher = Arc::clone(&fetcher);
            let url = url.clone();
            tokio::spawn(async move { fetcher.fetch(&url).await })
        })
        .collect();
    for call in calls {
        call.await.unwrap().unwrap();
    }

    let mut arrivals = up.arrivals.lock().unwrap().clone();
    arrivals.sort();
    assert_eq!(arrivals.len(), 3);
    for pair in arrivals.windows(2) {
        let gap = pair[1].duration_since(pair[0]);
        assert!(gap >= Duration::from_millis(150), "dispatches {:?} apart", gap);
    }
}

#[tokio::test]
async fn test_fetch_json_decodes_body() {
    let up = Upstream::default();
    let base = spawn(router(&up)).await;
    let fetcher = RateLimitedFetcher::new("test", &quick_config()).unwrap();

    let value: serde_json::Value = fetch_json(&fetcher, &format!("{}/json", base))
        .await
        .unwrap();
    assert_eq!(value["title"], "Dune");

    let err = fetch_json::<Vec<u32>>(&fetcher, &format!("{}/json", base))
        .await
        .unwrap_err();
    assert!(err.is_upstream());
}
