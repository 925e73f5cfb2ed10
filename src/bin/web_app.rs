use anyhow::Context;

use user_portal::{build_web_app, serve, spawn_admin, telemetry, Shutdown, WebConfig, WebState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init("user_portal=debug,web_app=debug,axum=info,tower_http=info");

    let config = WebConfig::from_env().context("load web config")?;
    let state = WebState::init(&config)?;
    tracing::info!(api = %state.api.base_url(), "rendering users from api");

    let shutdown = Shutdown::new();
    shutdown.listen_for_signals();
    spawn_admin(config.admin_addr, shutdown.clone());

    serve(config.addr, build_web_app(state), shutdown).await?;
    tracing::info!("web server stopped");
    Ok(())
}
