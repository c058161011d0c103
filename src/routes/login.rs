use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::relay::Service;
use crate::routes::AppState;
use crate::session::SessionUser;

#[derive(Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// POST /login
///
/// Proxies the credentials to the trading backend. On success the backend's
/// `data` payload becomes the new session cookie; a 401 here means bad
/// credentials and is passed through without any refresh attempt.
pub async fn action(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Response, AppError> {
    let body = json!({
        "username": input.username,
        "password": input.password,
    });
    let (status, payload) = state
        .api
        .call(Service::Py, Method::POST, "/login", Some(&body))
        .await?;

    if status != StatusCode::OK {
        tracing::warn!(username = %input.username, status = %status, "login rejected");
        return Ok((status, Json(json!({"ok": false, "data": {}}))).into_response());
    }

    let user: SessionUser = serde_json::from_value(payload["data"].clone())
        .map_err(|e| AppError::Internal(format!("malformed login response: {e}")))?;
    let set_cookie = state.session.write(&user)?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, set_cookie)],
        Json(json!({"ok": true, "data": user})),
    )
        .into_response())
}
