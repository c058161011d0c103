use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::auth::{issue_token_pair, validate_token};
use crate::error::AppError;
use crate::routes::{AppState, cookie_header};
use crate::session::SessionUser;

/// POST /refresh
///
/// Mints a fresh access/refresh token pair from the session's refresh token.
/// The whole session payload is replaced atomically and returned both as the
/// response body and as a new session cookie. Callers without a readable
/// session, or whose refresh token fails verification, get a 401.
pub async fn action(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let Some(current) = state.session.read(cookie_header(&headers)) else {
        return Ok(unauthorized());
    };

    let claims = match validate_token(&current.refresh_token, &state.config.auth.jwt_secret) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(username = %current.username, "refresh token rejected: {e}");
            return Ok(unauthorized());
        }
    };

    // Signing failure here is fatal and surfaces as a 500
    let pair = issue_token_pair(claims.id, claims.role, &state.config.auth)?;

    let user = SessionUser {
        role: claims.role,
        username: current.username,
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        email: current.email,
    };
    let set_cookie = state.session.write(&user)?;

    Ok((StatusCode::OK, [(header::SET_COOKIE, set_cookie)], Json(user)).into_response())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Could not validate credentials"})),
    )
        .into_response()
}
