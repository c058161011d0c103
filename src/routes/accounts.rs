use axum::{extract::State, http::HeaderMap, response::Response};
use reqwest::Method;

use crate::error::AppError;
use crate::relay::Service;
use crate::routes::{AppState, cookie_header, relayed};

/// GET /api/account/stats - account equity and performance numbers
pub async fn stats(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let outcome = state
        .api
        .relay(
            Service::Py,
            Method::GET,
            "/account/stats",
            cookie_header(&headers),
            None,
        )
        .await?;
    Ok(relayed(outcome))
}
