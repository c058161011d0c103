use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::routes::AppState;

/// POST /logout
///
/// Clears the session cookie and redirects to login. No backend call: the
/// tokens simply expire on their own.
pub async fn action(State(state): State<AppState>) -> impl IntoResponse {
    let cleared = state.session.destroy();
    (
        StatusCode::SEE_OTHER,
        [
            (header::SET_COOKIE, cleared),
            (header::LOCATION, "/login".to_string()),
        ],
    )
}
