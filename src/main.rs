use dotenvy::dotenv;
use tracing::{error, info};

use everato::metrics::init_metrics;
use everato::router::init_router;
use everato::state::init_app_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "storage/logs".to_string());
    let _log_guard = everato::logging::init_tracing(&log_dir)?;

    let metrics = init_metrics();

    let state = match init_app_state().await {
        Ok(state) => state.with_metrics(metrics),
        Err(e) => {
            error!(error = %e, "failed to connect to database");
            return Err(e.into());
        }
    };

    let bind_address = state.server_config.bind_address.clone();
    let api_prefix = state.server_config.api_prefix.clone();
    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, prefix = %api_prefix, "server listening");
    info!("OpenAPI document available at http://{}/api-docs/openapi.json", bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
