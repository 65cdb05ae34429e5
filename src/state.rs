use std::fmt;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;

use everato_auth::TokenSigner;
use everato_config::{CorsConfig, DatabaseConfig, JwtConfig, ServerConfig};
use everato_db::{AccountStore, PgAccountStore, init_db_pool};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub accounts: Arc<dyn AccountStore>,
    pub signer: TokenSigner,
    pub jwt_config: JwtConfig,
    pub server_config: ServerConfig,
    pub cors_config: CorsConfig,
    pub metrics: Option<PrometheusHandle>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db)
            .field("signer", &self.signer)
            .field("server_config", &self.server_config)
            .field("cors_config", &self.cors_config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        db: PgPool,
        accounts: Arc<dyn AccountStore>,
        jwt_config: JwtConfig,
        server_config: ServerConfig,
        cors_config: CorsConfig,
    ) -> Self {
        Self {
            db,
            accounts,
            signer: TokenSigner::from_config(&jwt_config),
            jwt_config,
            server_config,
            cors_config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}

pub async fn init_app_state() -> Result<AppState, sqlx::Error> {
    let db = init_db_pool(&DatabaseConfig::from_env()).await?;
    let accounts = Arc::new(PgAccountStore::new(db.clone()));

    Ok(AppState::new(
        db,
        accounts,
        JwtConfig::from_env(),
        ServerConfig::from_env(),
        CorsConfig::from_env(),
    ))
}
