use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo::UserStore;

/// Per-request handle on the user store. Extracting it runs the schema
/// bootstrap, so a handler never sees a store whose connection failed.
pub struct UserContext {
    pub store: Arc<dyn UserStore>,
}

#[async_trait]
impl FromRequestParts<AppState> for UserContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state.users.ensure_schema().await?;
        Ok(UserContext {
            store: Arc::clone(&state.users),
        })
    }
}
