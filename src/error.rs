//! Typed errors for the user resource and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("database unavailable: {0}")]
    DatabaseUnavailable(String),
    #[error("No such ID: {0}")]
    NotFound(i32),
    #[error("ID already exists: no free ID at or above {0}")]
    AlreadyExists(i32),
    #[error("malformed request: {0}")]
    Malformed(String),
    #[error("database: {0}")]
    Database(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::DatabaseUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadyExists(_) => StatusCode::CONFLICT,
            ApiError::Malformed(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Configuration(_)
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => ApiError::DatabaseUnavailable(e.to_string()),
            other => ApiError::Database(other.to_string()),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    #[serde(rename = "Status")]
    pub status: &'static str,
    pub reason: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::warn!(%status, error = %self, "request rejected");
        }
        let body = ErrorBody {
            status: "ERROR",
            reason: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Failures of the rendering gateway that are not a missing user.
#[derive(Error, Debug)]
pub enum WebError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("cannot build users API url from '{0}'")]
    BaseUrl(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "users API call failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error: {self}"),
        )
            .into_response()
    }
}
