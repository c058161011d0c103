//! Shared helpers for the integration suites
//!
//! Backend mocks are real axum servers on ephemeral ports so the relay is
//! exercised over actual HTTP, cookies and all.

#![allow(dead_code)]

use alphawing_gateway::config::{
    AuthConfig, Config, HttpConfig, LoggingConfig, ServerConfig, ServicesConfig, SessionConfig,
};
use alphawing_gateway::session::SessionStore;
use axum::Router;

pub const JWT_SECRET: &str = "test-jwt-secret-at-least-32-chars!!";
pub const COOKIE_SECRET: &str = "test-cookie-secret-at-least-32-chars";

/// Gateway config pointing every backend service at `base_url`
pub fn test_config(base_url: &str) -> Config {
    Config {
        environment: "development".to_string(),
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
        },
        auth: AuthConfig {
            jwt_secret: JWT_SECRET.to_string(),
            access_token_expire_minutes: 10,
            refresh_token_expire_minutes: 10080,
        },
        session: SessionConfig {
            secret: COOKIE_SECRET.to_string(),
            max_age_seconds: 86400,
        },
        services: ServicesConfig {
            settings_url: base_url.to_string(),
            py_url: base_url.to_string(),
            allowed_origin: "http://localhost:5173".to_string(),
        },
        http: HttpConfig::default(),
        logging: LoggingConfig::default(),
    }
}

pub fn test_session_store() -> SessionStore {
    SessionStore::new(
        &SessionConfig {
            secret: COOKIE_SECRET.to_string(),
            max_age_seconds: 86400,
        },
        "development",
    )
}

/// Serve `app` on an ephemeral port, returning its base URL
pub async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock backend");
    });
    format!("http://{addr}")
}

/// Collect a response body as JSON
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    use http_body_util::BodyExt;
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}
