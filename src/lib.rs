//! Users REST API backed by Postgres, and an HTML gateway that renders users
//! fetched from that API.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod schema;
pub mod shutdown;
pub mod state;
pub mod telemetry;
pub mod users;
pub mod web;

pub use app::{build_api_app, build_web_app, serve, spawn_admin};
pub use config::{ApiConfig, DatabaseConfig, StoreBackend, WebConfig};
pub use error::{ApiError, WebError};
pub use shutdown::Shutdown;
pub use state::{AppState, WebState};
