//! The read-only account store consulted by the guards and login flows.

use async_trait::async_trait;

use everato_auth::Principal;
use everato_core::AuthError;
use everato_models::{Admin, User};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("account not found")]
    NotFound,
    #[error("account store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AuthError::PrincipalNotFound,
            StoreError::Unavailable(_) => AuthError::StoreUnavailable,
        }
    }
}

/// Looks accounts up by identifier or email. Implementations never write.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Resolves an administrative principal from the `uid` carried by a token.
    async fn principal_by_id(&self, id: &str) -> Result<Principal, StoreError>;

    async fn admin_by_email(&self, email: &str) -> Result<Admin, StoreError>;

    async fn user_by_email(&self, email: &str) -> Result<User, StoreError>;

    async fn user_by_id(&self, id: &str) -> Result<User, StoreError>;
}
