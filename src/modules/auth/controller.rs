use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use everato_core::AppError;
use everato_models::UserResponse;
use everato_models::users::{
    LoginRequest, LoginResponse, MeResponse, MessageResponse, RefreshResponse, RegisterRequest,
};

use crate::middleware::auth::AuthUser;
use crate::middleware::guard::USER_COOKIE;
use crate::state::AppState;
use crate::utils::cookies::{clear_cookie, session_cookie};
use crate::validator::ValidatedJson;

use super::service::AuthService;

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable code, present on authentication and authorization failures
    pub reason: Option<String>,
}

/// Create a regular account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Bad request - malformed body", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = AuthService::register_user(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login and receive a session token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, `jwt` cookie set", body = LoginResponse),
        (status = 400, description = "Bad request - malformed body", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn login_user(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let response = AuthService::login_user(state.accounts.as_ref(), &state.signer, dto).await?;

    let cookie = session_cookie(
        USER_COOKIE,
        response.token.clone(),
        state.signer.lifetime_secs(),
        &state.server_config,
    );

    Ok((jar.add(cookie), Json(response)))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Logged out, `jwt` cookie cleared", body = MessageResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn logout_user(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.add(clear_cookie(USER_COOKIE, &state.server_config));
    (jar, Json(MessageResponse::new("Logged out successfully")))
}

/// Issue a fresh token for the current session
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    responses(
        (status = 200, description = "New token issued, `jwt` cookie replaced", body = RefreshResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state, jar))]
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    auth_user: AuthUser,
) -> Result<(CookieJar, Json<RefreshResponse>), AppError> {
    let response =
        AuthService::refresh_token(state.accounts.as_ref(), &state.signer, auth_user.uid()).await?;

    let cookie = session_cookie(
        USER_COOKIE,
        response.token.clone(),
        state.signer.lifetime_secs(),
        &state.server_config,
    );

    Ok((jar.add(cookie), Json(response)))
}

/// The identity behind the current session
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current identity", body = MeResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let me = AuthService::current_user(state.accounts.as_ref(), auth_user.uid()).await?;
    Ok(Json(me))
}
