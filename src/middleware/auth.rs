use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use everato_core::{AdminRole, AppError, AuthError};

/// Identity attached to a request by a guard.
///
/// Inserted once as a request extension and only read afterwards; handlers
/// reach it through the [`AuthUser`] and [`AdminUser`] extractors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub uid: String,
    pub is_admin: bool,
    pub admin_role: Option<AdminRole>,
}

impl AuthContext {
    pub fn user(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            is_admin: false,
            admin_role: None,
        }
    }

    pub fn admin(uid: impl Into<String>, role: AdminRole) -> Self {
        Self {
            uid: uid.into(),
            is_admin: true,
            admin_role: Some(role),
        }
    }

    pub fn admin_id(&self) -> Option<&str> {
        self.is_admin.then_some(self.uid.as_str())
    }
}

/// Any authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthContext);

impl AuthUser {
    pub fn uid(&self) -> &str {
        &self.0.uid
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AuthError::NoToken.into())
    }
}

/// A caller confirmed as an administrator by the admin guard.
///
/// The role is the one read at authentication time; handlers that mutate
/// state re-read the acting account inside their transaction.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser {
    pub id: Uuid,
    pub role: AdminRole,
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = parts
            .extensions
            .get::<AuthContext>()
            .ok_or(AuthError::NoToken)?;

        let (Some(id), Some(role)) = (context.admin_id(), context.admin_role) else {
            return Err(AuthError::PrincipalNotFound.into());
        };

        let id = Uuid::parse_str(id).map_err(|_| AuthError::PrincipalNotFound)?;

        Ok(AdminUser { id, role })
    }
}
