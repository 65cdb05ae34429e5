//! Per-request deadline.
//!
//! The downstream handler runs on its own task and hands its response back
//! over a one-shot channel while the middleware races it against the deadline.
//! Whichever side claims the [`ResponseGuard`] first owns the response: a
//! handler that finishes after the deadline has its response dropped, and a
//! timeout that fires after the handler claimed defers to the handler.
//!
//! Timing out does not abort the handler. It flips the shared state to
//! [`DeadlineState::TimedOut`], which handlers can observe through the
//! [`RequestDeadline`] extractor to stop early.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::{oneshot, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{error, warn};

use everato_config::DEFAULT_REQUEST_TIMEOUT;
use everato_core::{AppError, AuthError};

use crate::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineState {
    Pending,
    Completed,
    TimedOut,
}

/// Single-writer latch over the request outcome.
#[derive(Debug, Clone)]
pub struct ResponseGuard {
    state: Arc<watch::Sender<DeadlineState>>,
}

impl ResponseGuard {
    pub fn new() -> (Self, watch::Receiver<DeadlineState>) {
        let (tx, rx) = watch::channel(DeadlineState::Pending);
        (Self { state: Arc::new(tx) }, rx)
    }

    /// Moves out of `Pending` into `outcome`. Only the first caller succeeds.
    pub fn claim(&self, outcome: DeadlineState) -> bool {
        self.state.send_if_modified(|state| {
            if *state == DeadlineState::Pending {
                *state = outcome;
                true
            } else {
                false
            }
        })
    }

    pub fn state(&self) -> DeadlineState {
        *self.state.borrow()
    }
}

/// The deadline of the current request, as seen from a handler.
#[derive(Debug, Clone)]
pub struct RequestDeadline {
    rx: watch::Receiver<DeadlineState>,
    deadline: Instant,
}

impl RequestDeadline {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() == DeadlineState::TimedOut
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Resolves once the request has timed out.
    ///
    /// Also resolves if the middleware and every handler-side copy of the
    /// guard are gone, since nobody is left to deliver a response.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|state| *state == DeadlineState::TimedOut).await;
    }
}

impl<S> FromRequestParts<S> for RequestDeadline
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestDeadline>()
            .cloned()
            .ok_or_else(|| AppError::internal_error("Request deadline unavailable".to_string()))
    }
}

/// Replaces an unusable configured timeout with the default.
pub fn resolve_timeout(configured: Duration) -> Duration {
    if configured.is_zero() {
        warn!(
            fallback_secs = DEFAULT_REQUEST_TIMEOUT.as_secs(),
            "request timeout of zero configured, using fallback"
        );
        DEFAULT_REQUEST_TIMEOUT
    } else {
        configured
    }
}

pub async fn enforce_deadline(
    State(limit): State<Duration>,
    mut req: Request,
    next: Next,
) -> Response {
    let deadline = Instant::now() + limit;
    let (guard, rx) = ResponseGuard::new();
    req.extensions_mut().insert(RequestDeadline { rx, deadline });

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let (tx, mut done) = oneshot::channel::<Response>();
    let handler_guard = guard.clone();
    let (late_method, late_path) = (method.clone(), path.clone());

    tokio::spawn(async move {
        let response = next.run(req).await;

        if handler_guard.claim(DeadlineState::Completed) {
            let _ = tx.send(response);
        } else {
            warn!(
                method = %late_method,
                path = %late_path,
                status = response.status().as_u16(),
                "late response discarded after timeout"
            );
            metrics::track_late_response_discarded();
        }
    });

    tokio::select! {
        result = &mut done => delivered(result, &method, &path),
        _ = sleep_until(deadline) => {
            if guard.claim(DeadlineState::TimedOut) {
                warn!(
                    method = %method,
                    path = %path,
                    timeout_ms = limit.as_millis() as u64,
                    "request timed out"
                );
                metrics::track_request_timeout();
                AppError::from(AuthError::RequestTimedOut).into_response()
            } else {
                // The handler won the race by a hair and is about to send.
                delivered(done.await, &method, &path)
            }
        }
    }
}

fn delivered(
    result: Result<Response, oneshot::error::RecvError>,
    method: &axum::http::Method,
    path: &str,
) -> Response {
    match result {
        Ok(response) => response,
        Err(_) => {
            error!(method = %method, path = %path, "handler task ended without a response");
            AppError::internal_error("Internal server error".to_string()).into_response()
        }
    }
}
