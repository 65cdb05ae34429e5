//! Application errors and the authentication/authorization failure taxonomy.
//!
//! [`AppError`] is what every handler returns. It pairs an HTTP status with an
//! [`anyhow::Error`] and an optional machine-readable reason code, and renders as
//!
//! ```json
//! { "error": "Invalid or expired token", "reason": "expired" }
//! ```
//!
//! [`AuthError`] enumerates every way the request pipeline can refuse a request.
//! Authentication failures map to `401`, authorization failures to `403`, a blown
//! request deadline to `408` and a failed commit after a permitted action to `500`.

use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Every reason the auth pipeline can refuse or abort a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Token not found or malformed")]
    NoToken,
    #[error("Token not found or malformed")]
    MalformedToken,
    #[error("Invalid or expired token")]
    InvalidSignature,
    #[error("Invalid or expired token")]
    Expired,
    #[error("Token missing UID")]
    MissingClaim,
    #[error("Unauthorized: not an admin user")]
    PrincipalNotFound,
    #[error("Error verifying admin status")]
    StoreUnavailable,
    #[error("You do not have permission to perform this action")]
    InsufficientPermission,
    #[error("This action cannot be performed on your own account")]
    SelfActionForbidden,
    #[error("Request timed out")]
    RequestTimedOut,
    #[error("Failed to persist changes")]
    TransactionFailure,
}

impl AuthError {
    /// Stable snake_case code included in the JSON body and in metric labels.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::NoToken => "no_token",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Expired => "expired",
            AuthError::MissingClaim => "missing_claim",
            AuthError::PrincipalNotFound => "principal_not_found",
            AuthError::StoreUnavailable => "store_unavailable",
            AuthError::InsufficientPermission => "insufficient_permission",
            AuthError::SelfActionForbidden => "self_action_forbidden",
            AuthError::RequestTimedOut => "request_timed_out",
            AuthError::TransactionFailure => "transaction_failure",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::NoToken
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::Expired
            | AuthError::MissingClaim
            | AuthError::PrincipalNotFound
            | AuthError::StoreUnavailable => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermission | AuthError::SelfActionForbidden => {
                StatusCode::FORBIDDEN
            }
            AuthError::RequestTimedOut => StatusCode::REQUEST_TIMEOUT,
            AuthError::TransactionFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for the failures the guards handle before business logic runs.
    pub fn is_authentication(&self) -> bool {
        self.status() == StatusCode::UNAUTHORIZED
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub reason: Option<&'static str>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            reason: None,
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::CONFLICT, err)
    }

    pub fn unauthorized(message: String) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow!(message))
    }

    pub fn internal_error(message: String) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, anyhow!(message))
    }

    pub fn with_reason(mut self, reason: &'static str) -> Self {
        self.reason = Some(reason);
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match self.reason {
            Some(reason) => json!({
                "error": self.error.to_string(),
                "reason": reason,
            }),
            None => json!({
                "error": self.error.to_string()
            }),
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::new(err.status(), err).with_reason(err.reason())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "database error");
        AppError::internal(anyhow!("Internal server error"))
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_authentication_failures_are_unauthorized() {
        for err in [
            AuthError::NoToken,
            AuthError::MalformedToken,
            AuthError::InvalidSignature,
            AuthError::Expired,
            AuthError::MissingClaim,
            AuthError::PrincipalNotFound,
            AuthError::StoreUnavailable,
        ] {
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED, "{err:?}");
            assert!(err.is_authentication());
        }
    }

    #[test]
    fn test_authorization_failures_are_forbidden() {
        assert_eq!(
            AuthError::InsufficientPermission.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AuthError::SelfActionForbidden.status(), StatusCode::FORBIDDEN);
        assert!(!AuthError::SelfActionForbidden.is_authentication());
    }

    #[test]
    fn test_timeout_and_transaction_statuses() {
        assert_eq!(
            AuthError::RequestTimedOut.status(),
            StatusCode::REQUEST_TIMEOUT
        );
        assert_eq!(
            AuthError::TransactionFailure.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_auth_error_renders_reason() {
        let response = AppError::from(AuthError::Expired).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid or expired token");
        assert_eq!(body["reason"], "expired");
    }

    #[tokio::test]
    async fn test_plain_error_has_no_reason() {
        let response = AppError::not_found(anyhow!("Admin not found")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Admin not found");
        assert!(body.get("reason").is_none());
    }
}
