//! Authentication guards.
//!
//! A [`Guard`] runs every request through the same steps:
//!
//! 1. **Extract** the token from a cookie, then from `Authorization: Bearer`.
//!    The admin guard looks for `admin_jwt` before the general `jwt` cookie.
//! 2. **Verify** signature, algorithm and expiry.
//! 3. **Claim** a non-empty `uid`.
//! 4. **Confirm** (admin guard only) that `uid` names an administrative
//!    account in the [`AccountStore`].
//! 5. **Forward** with an [`AuthContext`] attached.
//!
//! Allow-listed public paths (login, register) are recognised before any of
//! this and always forwarded. The admin guard does no token work on them at
//! all; the user guard still attaches a context when a valid token happens to
//! be present, which needs no store lookup. Elsewhere a failure is rejected
//! according to the guard's [`RejectPolicy`], fixed at construction.
//!
//! # Example
//!
//! ```ignore
//! let admin_routes = init_admin_router().route_layer(middleware::from_fn_with_state(
//!     Guard::admin(&state, RejectPolicy::Json),
//!     require_auth,
//! ));
//! ```

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, warn};

use everato_auth::TokenSigner;
use everato_core::{AppError, AuthError};
use everato_db::AccountStore;

use crate::metrics;
use crate::middleware::auth::AuthContext;
use crate::state::AppState;

pub const USER_COOKIE: &str = "jwt";
pub const ADMIN_COOKIE: &str = "admin_jwt";

pub const USER_LOGIN_PAGE: &str = "/auth/login";
pub const ADMIN_LOGIN_PAGE: &str = "/admin/login";

const USER_PUBLIC_PATHS: &[&str] = &["/auth/login", "/auth/register", "/auth/logout"];
const ADMIN_PUBLIC_PATHS: &[&str] = &["/admin/login"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardKind {
    User,
    Admin,
}

impl GuardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardKind::User => "user",
            GuardKind::Admin => "admin",
        }
    }

    /// Cookies consulted, in priority order.
    fn cookie_names(&self) -> &'static [&'static str] {
        match self {
            GuardKind::User => &[USER_COOKIE],
            GuardKind::Admin => &[ADMIN_COOKIE, USER_COOKIE],
        }
    }
}

/// How a guard answers a request it refuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectPolicy {
    /// `401` with `{"error", "reason"}`.
    Json,
    /// `302 Found` to the given login page.
    Redirect(String),
}

impl RejectPolicy {
    pub fn from_config(redirect: bool, login_page: &str) -> Self {
        if redirect {
            RejectPolicy::Redirect(login_page.to_string())
        } else {
            RejectPolicy::Json
        }
    }
}

#[derive(Clone)]
pub struct Guard {
    kind: GuardKind,
    reject: RejectPolicy,
    public_paths: Arc<[String]>,
    api_prefix: String,
    signer: TokenSigner,
    accounts: Arc<dyn AccountStore>,
}

impl Guard {
    pub fn user(state: &AppState, reject: RejectPolicy) -> Self {
        Self::new(GuardKind::User, state, reject, USER_PUBLIC_PATHS)
    }

    pub fn admin(state: &AppState, reject: RejectPolicy) -> Self {
        Self::new(GuardKind::Admin, state, reject, ADMIN_PUBLIC_PATHS)
    }

    fn new(kind: GuardKind, state: &AppState, reject: RejectPolicy, public: &[&str]) -> Self {
        Self {
            kind,
            reject,
            public_paths: public.iter().map(|p| p.to_string()).collect(),
            api_prefix: state.server_config.api_prefix.clone(),
            signer: state.signer.clone(),
            accounts: state.accounts.clone(),
        }
    }

    /// Exact match, or exact match once the API prefix is stripped.
    pub fn is_public(&self, path: &str) -> bool {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        let unprefixed = path.strip_prefix(self.api_prefix.as_str());

        self.public_paths
            .iter()
            .any(|public| path == public || unprefixed == Some(public.as_str()))
    }

    fn extract_token(&self, headers: &HeaderMap) -> Option<String> {
        let jar = CookieJar::from_headers(headers);

        self.kind
            .cookie_names()
            .iter()
            .find_map(|name| {
                jar.get(name)
                    .map(|cookie| cookie.value().trim().to_string())
                    .filter(|value| !value.is_empty())
            })
            .or_else(|| bearer_token(headers))
    }

    /// Resolves the caller's identity or the reason it cannot be trusted.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let token = self.extract_token(headers).ok_or(AuthError::NoToken)?;
        let claims = self.signer.verify(&token)?;
        let uid = claims.uid()?;

        match self.kind {
            GuardKind::User => Ok(AuthContext::user(uid)),
            GuardKind::Admin => {
                let principal = self.accounts.principal_by_id(uid).await?;
                if !principal.role.is_admin() {
                    return Err(AuthError::PrincipalNotFound);
                }
                Ok(AuthContext::admin(uid, principal.role))
            }
        }
    }

    /// Identity for a public path. Only the user guard looks, since its
    /// check is signature-only.
    async fn optional_context(&self, headers: &HeaderMap) -> Option<AuthContext> {
        match self.kind {
            GuardKind::User => self.authenticate(headers).await.ok(),
            GuardKind::Admin => None,
        }
    }

    fn reject(&self, err: AuthError) -> Response {
        match &self.reject {
            RejectPolicy::Json => AppError::from(err).into_response(),
            RejectPolicy::Redirect(login_page) => {
                (StatusCode::FOUND, [(header::LOCATION, login_page.clone())]).into_response()
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Full request path, including any prefix stripped by nested routers.
fn request_path(req: &Request) -> String {
    req.extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| req.uri().path().to_string())
}

pub async fn require_auth(State(guard): State<Guard>, mut req: Request, next: Next) -> Response {
    let path = request_path(&req);

    if guard.is_public(&path) {
        let context = guard.optional_context(req.headers()).await;
        if let Some(context) = context {
            req.extensions_mut().insert(context);
        }
        debug!(guard = guard.kind.as_str(), path = %path, "public path, forwarding");
        return next.run(req).await;
    }

    let outcome = guard.authenticate(req.headers()).await;

    match outcome {
        Ok(context) => {
            debug!(guard = guard.kind.as_str(), uid = %context.uid, "request authenticated");
            req.extensions_mut().insert(context);
            next.run(req).await
        }
        Err(err) => {
            warn!(
                guard = guard.kind.as_str(),
                path = %path,
                reason = err.reason(),
                "request rejected"
            );
            metrics::track_guard_rejection(guard.kind.as_str(), err.reason());
            guard.reject(err)
        }
    }
}
