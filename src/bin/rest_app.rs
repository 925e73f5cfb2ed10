use anyhow::Context;
use clap::Parser;

use user_portal::{build_api_app, serve, spawn_admin, telemetry, ApiConfig, AppState, Shutdown};

/// Users REST API.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Database username; overrides DB_USER.
    db_username: Option<String>,
    /// Database password; overrides DB_PASSWORD.
    db_password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init("user_portal=debug,rest_app=debug,axum=info,tower_http=info");

    let cli = Cli::parse();
    let mut config = ApiConfig::from_env().context("load api config")?;
    config
        .database
        .override_credentials(cli.db_username, cli.db_password);

    let state = AppState::init(&config).await.context("init app state")?;

    let shutdown = Shutdown::new();
    shutdown.listen_for_signals();
    spawn_admin(config.admin_addr, shutdown.clone());

    serve(config.addr, build_api_app(state), shutdown).await?;
    tracing::info!("api server stopped");
    Ok(())
}
