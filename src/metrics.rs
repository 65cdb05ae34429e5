use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::state::AppState;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if observability is enabled via OBSERVABILITY_ENABLED env var
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true) // Enabled by default
    })
}

/// Initialize Prometheus metrics exporter with upkeep task.
/// Returns None if observability is disabled or the recorder cannot be installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if !is_observability_enabled() {
        return None;
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5,
                10.0,
            ],
        )
        .and_then(|builder| builder.install_recorder())
        .map_err(|e| warn!(error = %e, "failed to install Prometheus recorder"))
        .ok()?;

    // Spawn upkeep task to clean stale metrics
    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Some(handle)
}

/// Metrics middleware to track HTTP requests
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let uri_path = req.uri().path().to_owned();

    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or(uri_path);

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status).increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);

    gauge!("http_requests_active").decrement(1.0);

    response
}

pub async fn render_metrics(State(state): State<AppState>) -> Response {
    match state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// Auth pipeline metrics

pub fn track_login_success(kind: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("logins_total", "kind" => kind, "status" => "success").increment(1);
}

pub fn track_login_failure(kind: &'static str, reason: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("logins_total", "kind" => kind, "status" => "failure", "reason" => reason)
        .increment(1);
}

pub fn track_registration() {
    if !is_observability_enabled() {
        return;
    }
    counter!("registrations_total").increment(1);
}

pub fn track_guard_rejection(guard: &'static str, reason: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("auth_guard_rejections_total", "guard" => guard, "reason" => reason).increment(1);
}

pub fn track_authorization_denied(action: &'static str, reason: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("authorization_denials_total", "action" => action, "reason" => reason).increment(1);
}

pub fn track_request_timeout() {
    if !is_observability_enabled() {
        return;
    }
    counter!("request_timeouts_total").increment(1);
}

pub fn track_late_response_discarded() {
    if !is_observability_enabled() {
        return;
    }
    counter!("late_responses_discarded_total").increment(1);
}
