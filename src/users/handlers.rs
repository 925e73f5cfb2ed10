use axum::{
    extract::{rejection::JsonRejection, Path},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    error::ApiError,
    state::AppState,
    users::{
        dto::{parse_user_id, UserAdded, UserDeleted, UserFetched, UserPayload, UserUpdated},
        extractors::UserContext,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/users/:user_id",
        get(get_user)
            .post(create_user)
            .put(update_user)
            .delete(delete_user),
    )
}

fn payload_name(body: Result<Json<UserPayload>, JsonRejection>) -> Result<String, ApiError> {
    let Json(payload) = body.map_err(|e| ApiError::Malformed(e.body_text()))?;
    payload.validated_name()
}

#[instrument(skip(ctx))]
pub async fn get_user(
    ctx: UserContext,
    Path(user_id): Path<String>,
) -> Result<Json<UserFetched>, ApiError> {
    let id = parse_user_id(&user_id)?;
    let user = ctx.store.read(id).await?;
    Ok(Json(UserFetched {
        status: "OK",
        user_name: user.user_name,
    }))
}

#[instrument(skip(ctx, body))]
pub async fn create_user(
    ctx: UserContext,
    Path(user_id): Path<String>,
    body: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<UserAdded>, ApiError> {
    let id = parse_user_id(&user_id)?;
    let name = payload_name(body)?;
    let user = ctx.store.create(id, &name).await?;
    info!(requested = id, user_id = user.user_id, "user added");
    Ok(Json(UserAdded {
        status: "OK",
        user_added: user.user_name,
        user_id: user.user_id,
    }))
}

#[instrument(skip(ctx, body))]
pub async fn update_user(
    ctx: UserContext,
    Path(user_id): Path<String>,
    body: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<UserUpdated>, ApiError> {
    let id = parse_user_id(&user_id)?;
    let name = payload_name(body)?;
    let user = ctx.store.update(id, &name).await?;
    info!(user_id = id, "user updated");
    Ok(Json(UserUpdated {
        status: "OK",
        user_updated: user.user_name,
    }))
}

#[instrument(skip(ctx))]
pub async fn delete_user(
    ctx: UserContext,
    Path(user_id): Path<String>,
) -> Result<Json<UserDeleted>, ApiError> {
    let id = parse_user_id(&user_id)?;
    ctx.store.delete(id).await?;
    info!(user_id = id, "user deleted");
    Ok(Json(UserDeleted {
        status: "OK",
        user_deleted: user_id,
    }))
}
