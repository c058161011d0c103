use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::resolve_identity;
use crate::routes::AppState;

/// Authentication middleware for the protected relay routes
///
/// Resolves the request's identity (session cookie, token cookies, or Bearer
/// header) and inserts it as an extension. Requests with no usable access
/// token are redirected to /login. Claims are deliberately not required:
/// header-only identities defer claims resolution to the backend, and an
/// expired access token is recovered by the relay's refresh path, not here.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let identity = resolve_identity(req.headers(), &state.session, &state.config.auth.jwt_secret);

    if identity.is_anonymous() {
        tracing::warn!("Request without credentials, redirecting to login");
        return (StatusCode::SEE_OTHER, [("Location", "/login")]).into_response();
    }

    req.extensions_mut().insert(identity);
    next.run(req).await
}
