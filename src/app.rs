use std::net::SocketAddr;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::shutdown::{admin_router, Shutdown};
use crate::state::{AppState, WebState};
use crate::{users, web};

pub const NOT_FOUND_MESSAGE: &str = "Whoops! Looks like this page went on vacation!";

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
}

async fn api_health(
    State(state): State<AppState>,
) -> Result<Json<HealthBody>, (StatusCode, Json<HealthBody>)> {
    if let Err(e) = state.users.ping().await {
        tracing::warn!(error = %e, "health check failed");
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthBody {
                status: "degraded",
                database: Some("unavailable"),
            }),
        ));
    }
    Ok(Json(HealthBody {
        status: "ok",
        database: Some("ok"),
    }))
}

async fn web_health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        database: None,
    })
}

pub fn build_api_app(state: AppState) -> Router {
    let router = Router::new()
        .merge(users::router())
        .route("/health", get(api_health))
        .fallback(not_found)
        .with_state(state);
    with_http_layers(router)
}

pub fn build_web_app(state: WebState) -> Router {
    let router = Router::new()
        .merge(web::router())
        .route("/health", get(web_health))
        .fallback(not_found)
        .with_state(state);
    with_http_layers(router)
}

fn with_http_layers(router: Router) -> Router {
    router.layer(CorsLayer::permissive()).layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &axum::http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                tracing::info_span!(
                    "http_request",
                    %method,
                    uri = %uri,
                    status = tracing::field::Empty
                )
            })
            .on_response(
                |res: &axum::http::Response<_>,
                 _latency: std::time::Duration,
                 span: &tracing::Span| {
                    let status = res.status();
                    span.record("status", tracing::field::display(status));
                    if status.is_server_error() {
                        tracing::error!(%status, "response");
                    } else {
                        tracing::info!(%status, "response");
                    }
                },
            ),
    )
}

/// Serve until `shutdown` fires, then drain in-flight requests.
pub async fn serve(addr: SocketAddr, app: Router, shutdown: Shutdown) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.wait())
        .await?;
    Ok(())
}

/// Start the management listener in the background when an address is configured.
pub fn spawn_admin(addr: Option<SocketAddr>, shutdown: Shutdown) {
    let Some(addr) = addr else {
        return;
    };
    tokio::spawn(async move {
        let app = admin_router(shutdown.clone());
        if let Err(e) = serve(addr, app, shutdown).await {
            tracing::error!(error = %e, %addr, "management listener failed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn unknown_path_gets_vacation_message() {
        let app = build_api_app(AppState::fake());
        let res = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], NOT_FOUND_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn stop_server_is_not_public() {
        let app = build_api_app(AppState::fake());
        let res = app
            .oneshot(Request::builder().uri("/stop_server").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn api_health_reports_database() {
        let app = build_api_app(AppState::fake());
        let res = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok", "database": "ok"}));
    }
}
