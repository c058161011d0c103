//! Relay behavior against a live mock backend
//!
//! Covers the refresh-and-retry contract: pass-through on success, exactly
//! one refresh-then-retry on 401, redirect-to-login when the refresh is
//! rejected, and no retry for other failure statuses.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reqwest::Method;
use serde_json::json;

use alphawing_gateway::relay::{ApiClient, RelayError, Service};
use alphawing_gateway::session::SessionStore;

#[derive(Default)]
struct Counters {
    stats: AtomicUsize,
    refresh: AtomicUsize,
}

#[derive(Clone)]
struct MockState {
    counters: Arc<Counters>,
    refresh_ok: bool,
}

/// `/account/stats` accepts any request carrying a gateway session cookie
/// and 401s everything else, standing in for an expired access token.
async fn mock_stats(State(state): State<MockState>, headers: HeaderMap) -> Response {
    state.counters.stats.fetch_add(1, Ordering::SeqCst);
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if cookie.contains("remix=") {
        (StatusCode::OK, Json(json!({"equity": 125000}))).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Could not validate credentials"})),
        )
            .into_response()
    }
}

async fn mock_refresh(State(state): State<MockState>) -> Response {
    state.counters.refresh.fetch_add(1, Ordering::SeqCst);
    if state.refresh_ok {
        (
            StatusCode::OK,
            Json(json!({
                "role": "client",
                "username": "x",
                "accessToken": "new-access",
                "refreshToken": "new-refresh",
                "email": "x@y.com"
            })),
        )
            .into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"detail": "expired"}))).into_response()
    }
}

async fn mock_missing() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"detail": "no such symbol"}))).into_response()
}

async fn setup(refresh_ok: bool) -> (ApiClient, SessionStore, Arc<Counters>) {
    let counters = Arc::new(Counters::default());
    let mock = Router::new()
        .route("/account/stats", get(mock_stats))
        .route("/refresh", post(mock_refresh))
        .route("/symbol/missing", get(mock_missing))
        .with_state(MockState {
            counters: counters.clone(),
            refresh_ok,
        });
    let base_url = helpers::spawn_backend(mock).await;

    let store = helpers::test_session_store();
    let api = ApiClient::new(&helpers::test_config(&base_url), store.clone()).expect("api client");
    (api, store, counters)
}

#[tokio::test]
async fn test_valid_session_passes_through_without_set_cookie() -> anyhow::Result<()> {
    let (api, store, counters) = setup(true).await;

    let user = alphawing_gateway::session::SessionUser {
        role: alphawing_gateway::auth::Role::Client,
        username: "x".to_string(),
        access_token: "still-valid".to_string(),
        refresh_token: "r".to_string(),
        email: "x@y.com".to_string(),
    };
    let cookie = store.cookie_pair(&user)?;

    let outcome = api
        .relay(
            Service::Py,
            Method::GET,
            "/account/stats",
            Some(&cookie),
            None,
        )
        .await?;

    assert!(outcome.success);
    assert_eq!(outcome.status, StatusCode::OK);
    assert_eq!(outcome.data["equity"], 125000);
    assert!(outcome.cookie_header.is_none());
    assert_eq!(counters.stats.load(Ordering::SeqCst), 1);
    assert_eq!(counters.refresh.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn test_expired_token_refreshes_once_and_retries() -> anyhow::Result<()> {
    let (api, store, counters) = setup(true).await;

    // A token-cookie identity the mock treats as expired
    let outcome = api
        .relay(
            Service::Py,
            Method::GET,
            "/account/stats",
            Some("accessToken=expired; refreshToken=old"),
            None,
        )
        .await?;

    assert!(outcome.success);
    assert_eq!(outcome.data["equity"], 125000);

    // Exactly two backend calls and one refresh
    assert_eq!(counters.stats.load(Ordering::SeqCst), 2);
    assert_eq!(counters.refresh.load(Ordering::SeqCst), 1);

    // The renewed session cookie carries the refreshed payload
    let set_cookie = outcome.cookie_header.expect("renewed session cookie");
    assert!(set_cookie.starts_with("remix="));
    let raw_pair = set_cookie.split(';').next().unwrap().to_owned();
    let renewed = store.read(Some(&raw_pair)).expect("readable session");
    assert_eq!(renewed.access_token, "new-access");
    assert_eq!(renewed.refresh_token, "new-refresh");
    assert_eq!(renewed.username, "x");
    Ok(())
}

#[tokio::test]
async fn test_failed_refresh_redirects_to_login_without_retry() {
    let (api, _store, counters) = setup(false).await;

    let result = api
        .relay(
            Service::Py,
            Method::GET,
            "/account/stats",
            Some("accessToken=expired"),
            None,
        )
        .await;

    assert!(matches!(result, Err(RelayError::RedirectToLogin)));
    // Original call once, refresh once, no retry of the original
    assert_eq!(counters.stats.load(Ordering::SeqCst), 1);
    assert_eq!(counters.refresh.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_non_401_failure_passes_through_without_refresh() -> anyhow::Result<()> {
    let (api, _store, counters) = setup(true).await;

    let outcome = api
        .relay(Service::Py, Method::GET, "/symbol/missing", None, None)
        .await?;

    assert!(!outcome.success);
    assert_eq!(outcome.status, StatusCode::NOT_FOUND);
    assert_eq!(outcome.data["detail"], "no such symbol");
    assert!(outcome.cookie_header.is_none());
    assert_eq!(counters.refresh.load(Ordering::SeqCst), 0);
    Ok(())
}
