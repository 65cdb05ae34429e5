//! # Everato DB
//!
//! Database pool, queries and the account store for the Everato API.
//!
//! - [`admins`] / [`users`]: plain query functions generic over any Postgres
//!   executor, so the same query runs against the pool or inside a transaction
//! - [`store`]: the read-only [`AccountStore`] the guards and login flows consult
//! - [`postgres`]: the Postgres-backed store
//! - `memory`: an in-memory store for tests (`test-utils` feature)
//!
//! # Example
//!
//! ```ignore
//! use everato_config::DatabaseConfig;
//! use everato_db::init_db_pool;
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()).await?;
//! let mut tx = pool.begin().await?;
//! let actor = everato_db::admins::find_for_share(&mut *tx, actor_id).await?;
//! ```

pub mod admins;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod postgres;
pub mod store;
pub mod users;

use everato_config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;

/// Initializes the PostgreSQL connection pool.
///
/// Every transactional operation checks out its own connection from this pool
/// and returns it when the transaction is committed, rolled back or dropped.
///
/// # Errors
///
/// Returns the driver error if the first connection cannot be established.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.url)
        .await
}

// Re-export for convenience
#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryAccountStore;
pub use postgres::PgAccountStore;
pub use sqlx::PgPool;
pub use store::{AccountStore, StoreError};
