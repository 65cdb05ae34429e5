use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{instrument, warn};
use uuid::Uuid;

use everato_auth::Principal;
use everato_models::{Admin, User};

use crate::store::{AccountStore, StoreError};
use crate::{admins, users};

/// [`AccountStore`] backed by the shared connection pool.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    warn!(error = %err, "account lookup failed");
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl AccountStore for PgAccountStore {
    #[instrument(skip(self))]
    async fn principal_by_id(&self, id: &str) -> Result<Principal, StoreError> {
        // Not a UUID, so it cannot name an account.
        let id = Uuid::parse_str(id).map_err(|_| StoreError::NotFound)?;

        admins::find_by_id(&self.pool, id)
            .await
            .map_err(unavailable)?
            .map(|admin| admin.principal())
            .ok_or(StoreError::NotFound)
    }

    #[instrument(skip(self))]
    async fn admin_by_email(&self, email: &str) -> Result<Admin, StoreError> {
        admins::find_by_email(&self.pool, email)
            .await
            .map_err(unavailable)?
            .ok_or(StoreError::NotFound)
    }

    #[instrument(skip(self))]
    async fn user_by_email(&self, email: &str) -> Result<User, StoreError> {
        users::find_by_email(&self.pool, email)
            .await
            .map_err(unavailable)?
            .ok_or(StoreError::NotFound)
    }

    #[instrument(skip(self))]
    async fn user_by_id(&self, id: &str) -> Result<User, StoreError> {
        let id = Uuid::parse_str(id).map_err(|_| StoreError::NotFound)?;

        users::find_by_id(&self.pool, id)
            .await
            .map_err(unavailable)?
            .ok_or(StoreError::NotFound)
    }
}
