//! Smoke checks against a running deployment. The same flow covers a local
//! run, a container and a cluster: only the URLs change.

use anyhow::{bail, ensure, Context};
use clap::{Args, Parser, Subcommand};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use user_portal::{telemetry, web::render::user_fragment};

#[derive(Parser, Debug)]
#[command(version, about = "Smoke checks for the users API and web gateway")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create, read back and delete a user through the API.
    Backend(UserArgs),
    /// Backend checks plus the rendered page of the web gateway.
    Combined {
        #[command(flatten)]
        user: UserArgs,
        #[arg(long, env = "WEB_BASE_URL", default_value = "http://127.0.0.1:5001")]
        web: String,
        /// Also check the stored row directly in this database.
        #[arg(long, env = "SMOKE_DATABASE_URL")]
        database_url: Option<String>,
    },
    /// Ask management listeners to stop their servers.
    Stop {
        #[arg(long = "admin", required = true)]
        admins: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct UserArgs {
    #[arg(long, env = "API_BASE_URL", default_value = "http://127.0.0.1:5000")]
    api: String,
    #[arg(long, default_value_t = 2)]
    id: i32,
    #[arg(long, default_value = "Anamim")]
    name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init("smoke=info,user_portal=info");

    let cli = Cli::parse();
    let client = Client::new();
    match cli.command {
        Command::Backend(user) => {
            let assigned = check_create_and_read(&client, &user).await?;
            cleanup(&client, &user.api, assigned).await?;
        }
        Command::Combined {
            user,
            web,
            database_url,
        } => {
            let assigned = check_create_and_read(&client, &user).await?;
            let stored = match &database_url {
                Some(url) => check_stored_row(url, assigned, &user.name).await,
                None => Ok(()),
            };
            let page = check_rendered_page(&client, &web, assigned, &user.name).await;
            cleanup(&client, &user.api, assigned).await?;
            stored?;
            page?;
        }
        Command::Stop { admins } => {
            for admin in admins {
                stop(&client, &admin).await?;
            }
        }
    }
    info!("all checks passed");
    Ok(())
}

async fn check_create_and_read(client: &Client, user: &UserArgs) -> anyhow::Result<i32> {
    let url = format!("{}/users/{}", user.api.trim_end_matches('/'), user.id);
    let res = client
        .post(&url)
        .json(&json!({ "user_name": user.name }))
        .send()
        .await
        .with_context(|| format!("POST {url}"))?;
    ensure!(res.status() == StatusCode::OK, "POST {url} returned {}", res.status());
    let body: Value = res.json().await.context("decode POST body")?;
    ensure!(body["User_added"] == user.name.as_str(), "unexpected POST body {body}");
    let assigned = body["user_id"]
        .as_i64()
        .and_then(|id| i32::try_from(id).ok())
        .unwrap_or(user.id);
    info!(requested = user.id, assigned, "user created");

    let url = format!("{}/users/{}", user.api.trim_end_matches('/'), assigned);
    let res = client.get(&url).send().await.with_context(|| format!("GET {url}"))?;
    ensure!(res.status() == StatusCode::OK, "GET {url} returned {}", res.status());
    let body: Value = res.json().await.context("decode GET body")?;
    ensure!(body["User_name"] == user.name.as_str(), "unexpected GET body {body}");
    info!(user_id = assigned, "user read back");
    Ok(assigned)
}

async fn check_stored_row(database_url: &str, user_id: i32, name: &str) -> anyhow::Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(database_url)
        .await
        .context("connect to database")?;
    let stored: Option<String> =
        sqlx::query_scalar("SELECT user_name FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&pool)
            .await
            .context("query users table")?;
    pool.close().await;
    ensure!(
        stored.as_deref() == Some(name),
        "users row {user_id} holds {stored:?}, expected {name:?}"
    );
    info!(user_id, "stored row matches");
    Ok(())
}

async fn check_rendered_page(
    client: &Client,
    web: &str,
    user_id: i32,
    name: &str,
) -> anyhow::Result<()> {
    let url = format!("{}/users/get_user_data/{}", web.trim_end_matches('/'), user_id);
    let res = client.get(&url).send().await.with_context(|| format!("GET {url}"))?;
    ensure!(res.status() == StatusCode::OK, "GET {url} returned {}", res.status());
    let html = res.text().await.context("read page")?;
    let expected = user_fragment(name);
    if !html.contains(&expected) {
        bail!("page {url} does not show {expected}: {html}");
    }
    info!(user_id, "rendered page shows user");
    Ok(())
}

async fn cleanup(client: &Client, api: &str, user_id: i32) -> anyhow::Result<()> {
    let url = format!("{}/users/{}", api.trim_end_matches('/'), user_id);
    let res = client.delete(&url).send().await.with_context(|| format!("DELETE {url}"))?;
    ensure!(res.status() == StatusCode::OK, "DELETE {url} returned {}", res.status());
    info!(user_id, "user deleted");
    Ok(())
}

async fn stop(client: &Client, admin: &str) -> anyhow::Result<()> {
    let url = format!("{}/stop_server", admin.trim_end_matches('/'));
    let res = client.post(&url).send().await.with_context(|| format!("POST {url}"))?;
    ensure!(res.status().is_success(), "POST {url} returned {}", res.status());
    info!(%url, "server stopping");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_accepts_optional_database_check() {
        let cli = Cli::try_parse_from([
            "smoke",
            "combined",
            "--api",
            "http://api:5000",
            "--web",
            "http://web:5001",
            "--database-url",
            "postgres://postgres@db/users",
        ])
        .unwrap();
        match cli.command {
            Command::Combined {
                user, database_url, ..
            } => {
                assert_eq!(user.api, "http://api:5000");
                assert_eq!(database_url.as_deref(), Some("postgres://postgres@db/users"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
