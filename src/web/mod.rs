pub mod client;
pub mod handlers;
pub mod render;

use crate::state::WebState;
use axum::Router;

pub use client::UsersApiClient;

pub fn router() -> Router<WebState> {
    Router::new().merge(handlers::page_routes())
}
