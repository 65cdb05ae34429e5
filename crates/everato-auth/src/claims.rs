//! JWT claim structure for session tokens.
//!
//! Only `uid` and `exp` drive access control. `sub`, `aud` and `iss` are
//! informational and kept for compatibility with tokens issued by earlier
//! deployments, which is also why they default to empty strings when absent.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use everato_core::AuthError;

/// Claims carried by every session token.
///
/// # Fields
///
/// - `sub`: `jwt_login_user_id_<id>`
/// - `aud`: `jwt_login_user_name_<username>`
/// - `iss`: application name
/// - `iat`/`exp`: issued-at and expiry, Unix seconds
/// - `uid`: the principal identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub aud: String,
    #[serde(default)]
    pub iss: String,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl Claims {
    /// Builds the claim set for a freshly authenticated account.
    pub fn for_login(id: &str, username: &str, issuer: &str, lifetime_secs: i64) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: format!("jwt_login_user_id_{}", id),
            aud: format!("jwt_login_user_name_{}", username),
            iss: issuer.to_string(),
            iat: now,
            exp: now + lifetime_secs,
            uid: Some(id.to_string()),
        }
    }

    /// The principal identifier. A missing or blank `uid` is never trusted.
    pub fn uid(&self) -> Result<&str, AuthError> {
        match self.uid.as_deref().map(str::trim) {
            Some(uid) if !uid.is_empty() => Ok(uid),
            _ => Err(AuthError::MissingClaim),
        }
    }
}
