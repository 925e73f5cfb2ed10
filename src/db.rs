use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::DatabaseConfig;
use crate::error::ApiError;

/// Build the pool without touching the network. Connections are opened on
/// first use, so an unreachable database surfaces per request as
/// `DatabaseUnavailable` instead of keeping the server from starting.
pub fn connect_lazy(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let opts = config.connect_options().context("database connect options")?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect_lazy_with(opts);
    tracing::info!(
        from_url = config.url.is_some(),
        host = %config.host,
        database = %config.name,
        max_connections = config.max_connections,
        "database pool configured"
    );
    Ok(pool)
}

/// Round-trip `SELECT 1`.
pub async fn ping(pool: &PgPool) -> Result<(), ApiError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| ApiError::DatabaseUnavailable(e.to_string()))?;
    Ok(())
}
