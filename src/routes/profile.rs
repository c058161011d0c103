use axum::{Extension, extract::State, http::HeaderMap, response::Response};
use reqwest::Method;

use crate::auth::Identity;
use crate::error::AppError;
use crate::relay::Service;
use crate::routes::{AppState, cookie_header, relayed};

/// GET /api/me - the acting user as the backend sees them
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(claims) = &identity.claims {
        tracing::debug!(user_id = claims.id, "identify request");
    }

    let outcome = state
        .api
        .relay(
            Service::Py,
            Method::GET,
            "/identify",
            cookie_header(&headers),
            None,
        )
        .await?;
    Ok(relayed(outcome))
}
