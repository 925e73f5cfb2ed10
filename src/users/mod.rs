use crate::state::AppState;
use axum::Router;

mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod memory;
pub mod repo;
pub mod repo_types;

pub use memory::MemoryUserStore;
pub use repo::{PgUserStore, UserStore};
pub use repo_types::User;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::user_routes())
}
