use std::sync::Arc;

use anyhow::Context;
use common_observability::LocatorMetrics;
use locator_service::{build_router, AppState, LocatorConfig, PgLocatorStore};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = LocatorConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to DATABASE_URL")?;
    let store = PgLocatorStore::new(pool);
    store.migrate().await.context("failed to apply migrations")?;

    let state = AppState {
        store: Arc::new(store),
        jwt_verifier: config.build_jwt_verifier()?,
        metrics: Arc::new(LocatorMetrics::new()),
        default_radius_meters: config.default_radius_meters,
    };
    let app = build_router(state, &config.allowed_origins);

    let addr = config.socket_addr()?;
    info!(%addr, origins = ?config.allowed_origins, "starting locator-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
