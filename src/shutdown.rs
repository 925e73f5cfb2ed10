//! Graceful stop: OS signals plus an optional loopback-only management port.

use std::sync::Arc;

use axum::{extract::State, routing::post, Router};
use tokio::sync::watch;

#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `trigger` has been called, including before this call.
    pub async fn wait(self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|stopped| *stopped).await;
    }

    pub fn listen_for_signals(&self) {
        let this = self.clone();
        tokio::spawn(async move {
            match wait_for_signal().await {
                Ok(()) => tracing::info!("shutdown signal received"),
                Err(e) => {
                    tracing::error!(error = %e, "cannot install signal handlers");
                    return;
                }
            }
            this.trigger();
        });
    }
}

pub async fn wait_for_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv()  => {},
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok(())
    }
}

/// Router for the management listener. Never merge this into a public router.
pub fn admin_router(shutdown: Shutdown) -> Router {
    Router::new()
        .route("/stop_server", post(stop_server))
        .with_state(shutdown)
}

async fn stop_server(State(shutdown): State<Shutdown>) -> &'static str {
    tracing::warn!("stop requested on management port");
    shutdown.trigger();
    "Server Stopped"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use std::time::Duration;
    use tower::ServiceExt;

    #[tokio::test]
    async fn wait_resolves_after_trigger() {
        let shutdown = Shutdown::new();
        let waiter = tokio::spawn(shutdown.clone().wait());
        assert!(!shutdown.is_triggered());
        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("wait finished")
            .unwrap();
    }

    #[tokio::test]
    async fn wait_after_trigger_returns_immediately() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), shutdown.wait())
            .await
            .expect("already triggered");
    }

    #[tokio::test]
    async fn stop_server_triggers_shutdown() {
        let shutdown = Shutdown::new();
        let app = admin_router(shutdown.clone());

        let res = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/stop_server")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Server Stopped");
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn stop_server_rejects_get() {
        let app = admin_router(Shutdown::new());
        let res = app
            .oneshot(Request::builder().uri("/stop_server").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
