use axum::{
    extract::{Path, State},
    response::Html,
    routing::get,
    Router,
};
use tracing::{info, instrument};

use crate::{
    error::WebError,
    state::WebState,
    web::render::{missing_user_fragment, user_fragment},
};

pub fn page_routes() -> Router<WebState> {
    Router::new().route("/users/get_user_data/:user_id", get(get_user_data))
}

#[instrument(skip(state))]
pub async fn get_user_data(
    State(state): State<WebState>,
    Path(user_id): Path<String>,
) -> Result<Html<String>, WebError> {
    match state.api.fetch_user_name(&user_id).await? {
        Some(name) => Ok(Html(user_fragment(&name))),
        None => {
            info!(%user_id, "no such user");
            Ok(Html(missing_user_fragment(&user_id)))
        }
    }
}
