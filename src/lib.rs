pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
pub mod relay;
pub mod routes;
pub mod session;

pub use config::Config;
pub use routes::AppState;

/// Create the app router from a validated config
///
/// Used by both the serve command and integration tests, which run the
/// router directly without binding a listener.
pub fn create_app(config: Config) -> anyhow::Result<axum::Router> {
    let session = session::SessionStore::new(&config.session, &config.environment);
    let api = relay::ApiClient::new(&config, session.clone())?;

    let state = AppState {
        config,
        session,
        api,
    };

    Ok(routes::router(state))
}
