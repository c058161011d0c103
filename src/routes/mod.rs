use axum::{
    Json, Router,
    http::{HeaderMap, HeaderValue, Method, header},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::auth_middleware;
use crate::relay::{ApiClient, RelayResponse};
use crate::session::SessionStore;

mod accounts;
mod health;
mod login;
mod logout;
mod profile;
mod refresh;
mod symbols;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub session: SessionStore,
    pub api: ApiClient,
}

pub fn router(state: AppState) -> Router {
    // Browser clients send credentialed cross-origin requests, mirroring the
    // original gateway's CORS setup
    let origin = state
        .config
        .services
        .allowed_origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:5173"));
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::PUT,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Relay routes require a resolvable identity
    let protected = Router::new()
        .route("/api/account/stats", get(accounts::stats))
        .route(
            "/api/symbols",
            get(symbols::list)
                .post(symbols::create)
                .delete(symbols::remove),
        )
        .route("/api/me", get(profile::me))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/login", post(login::action))
        .route("/logout", post(logout::action))
        .route("/refresh", post(refresh::action))
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The caller's Cookie header, forwarded verbatim to relayed backends
pub(crate) fn cookie_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::COOKIE).and_then(|v| v.to_str().ok())
}

/// Turn a relay outcome into this route's own response, attaching any
/// renewed session cookie so the browser picks it up
pub(crate) fn relayed(outcome: RelayResponse) -> Response {
    let body = Json(json!({
        "success": outcome.success,
        "data": outcome.data,
    }));

    match outcome.cookie_header {
        Some(cookie) => (outcome.status, [(header::SET_COOKIE, cookie)], body).into_response(),
        None => (outcome.status, body).into_response(),
    }
}
