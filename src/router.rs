use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use axum::{Json, Router, middleware};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::{metrics_middleware, render_metrics};
use crate::middleware::guard::{ADMIN_LOGIN_PAGE, Guard, RejectPolicy, USER_LOGIN_PAGE, require_auth};
use crate::middleware::timeout::{enforce_deadline, resolve_timeout};
use crate::modules::admin::router::init_admin_router;
use crate::modules::auth::router::init_auth_router;
use crate::state::AppState;

/// Builds the application.
///
/// Layer order, outermost first: request logging, deadline, metrics, CORS.
/// The guards sit on the route groups, so they run inside the deadline and
/// only for requests that matched a route.
pub fn init_router(state: AppState) -> Router {
    let config = &state.server_config;

    // Login routes live under the API prefix like everything else.
    let user_login = format!("{}{}", config.api_prefix, USER_LOGIN_PAGE);
    let admin_login = format!("{}{}", config.api_prefix, ADMIN_LOGIN_PAGE);

    let user_guard = Guard::user(
        &state,
        RejectPolicy::from_config(config.redirect_on_reject, &user_login),
    );
    let admin_guard = Guard::admin(
        &state,
        RejectPolicy::from_config(config.redirect_on_reject, &admin_login),
    );
    let request_timeout = resolve_timeout(config.request_timeout);

    let api = Router::new()
        .nest(
            "/auth",
            init_auth_router()
                .route_layer(middleware::from_fn_with_state(user_guard, require_auth)),
        )
        .nest(
            "/admin",
            init_admin_router()
                .route_layer(middleware::from_fn_with_state(admin_guard, require_auth)),
        );

    let api = if config.api_prefix.is_empty() {
        api
    } else {
        Router::new().nest(&config.api_prefix, api)
    };

    let cors = {
        let allowed_origins: Vec<HeaderValue> = state
            .cors_config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(true)
    };

    api.route("/health", get(health_check))
        .route("/metrics", get(render_metrics))
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn_with_state(
            request_timeout,
            enforce_deadline,
        ))
        .layer(middleware::from_fn(logging_middleware))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Liveness only; the database is not consulted.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
