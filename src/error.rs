use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::relay::RelayError;

#[derive(Error, Debug)]
pub enum AppError {
    /// Control-flow signal: the session could not be refreshed and the user
    /// must authenticate again
    #[error("authentication required")]
    RedirectToLogin,

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::RedirectToLogin => AppError::RedirectToLogin,
            RelayError::Http(e) => AppError::Upstream(e),
            RelayError::Session(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::RedirectToLogin => {
                (StatusCode::SEE_OTHER, [(header::LOCATION, "/login")]).into_response()
            }
            AppError::Upstream(e) => {
                tracing::error!("Upstream request failed: {:?}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({"error": "upstream request failed"})),
                )
                    .into_response()
            }
            AppError::BadRequest(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"error": msg})),
            )
                .into_response(),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "internal server error"})),
                )
                    .into_response()
            }
        }
    }
}
