use std::sync::Arc;

use fritter_server::config::AppConfig;
use fritter_server::routes;
use fritter_server::AppState;
use fritter_shared::clients::db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fritter_shared::middleware::init_tracing("fritter-server");

    let config = AppConfig::load()?;
    let port = config.port;

    if config.jwt_secret != fritter_shared::middleware::jwt_secret() {
        tracing::warn!("FRITTER__JWT_SECRET differs from JWT_SECRET; issued tokens will not verify");
    }
    if config.jwt_secret == fritter_shared::middleware::DEV_JWT_SECRET {
        tracing::warn!("using the development JWT secret");
    }

    let db = db::create_pool(&config.database_url, config.db_pool_size)?;
    let metrics_handle = fritter_shared::middleware::init_metrics()?;

    let state = Arc::new(AppState {
        db,
        config,
        metrics_handle: Some(metrics_handle),
    });

    let app = routes::router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "fritter-server starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
