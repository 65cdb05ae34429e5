mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Router, middleware};
use everato::middleware::timeout::{RequestDeadline, enforce_deadline};
use tower::ServiceExt;

use common::{body_json, get as get_request};

#[derive(Clone, Default)]
struct Probe {
    finished: Arc<AtomicUsize>,
    saw_cancel: Arc<AtomicBool>,
}

async fn slow(State(probe): State<Probe>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(200)).await;
    probe.finished.fetch_add(1, Ordering::SeqCst);
    "slow"
}

async fn fast() -> &'static str {
    "fast"
}

async fn cooperative(State(probe): State<Probe>, deadline: RequestDeadline) -> &'static str {
    deadline.cancelled().await;
    probe.saw_cancel.store(true, Ordering::SeqCst);
    "gave up"
}

async fn panics() -> &'static str {
    panic!("handler blew up")
}

fn app(limit: Duration, probe: Probe) -> Router {
    Router::new()
        .route("/slow", get(slow))
        .route("/fast", get(fast))
        .route("/cooperative", get(cooperative))
        .route("/panic", get(panics))
        .with_state(probe)
        .layer(middleware::from_fn_with_state(limit, enforce_deadline))
}

#[tokio::test]
async fn test_fast_handler_passes_through() {
    let response = app(Duration::from_secs(1), Probe::default())
        .oneshot(get_request("/fast"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_concurrent_slow_requests_each_get_one_timeout_body() {
    let probe = Probe::default();
    let router = app(Duration::from_millis(50), probe.clone());

    let requests = (0..8).map(|_| {
        let router = router.clone();
        tokio::spawn(async move { router.oneshot(get_request("/slow")).await.unwrap() })
    });

    for handle in requests.collect::<Vec<_>>() {
        let response = handle.await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Request timed out");
        assert_eq!(body["reason"], "request_timed_out");
    }

    // Timed-out handlers are not aborted; their late responses are dropped.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(probe.finished.load(Ordering::SeqCst), 8);
}

#[tokio::test]
async fn test_handler_observes_cancellation() {
    let probe = Probe::default();

    let response = app(Duration::from_millis(30), probe.clone())
        .oneshot(get_request("/cooperative"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(probe.saw_cancel.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_panicking_handler_yields_internal_error() {
    let response = app(Duration::from_secs(1), Probe::default())
        .oneshot(get_request("/panic"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
