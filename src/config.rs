use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// "development" or "production"; controls cookie attributes and log format
    #[serde(default = "default_environment")]
    pub environment: String,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub session: SessionConfig,
    pub services: ServicesConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Signing secret for access and refresh tokens. No default on purpose:
    /// the process must not start without one (see `Config::validate`).
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_access_expire_minutes")]
    pub access_token_expire_minutes: u64,
    #[serde(default = "default_refresh_expire_minutes")]
    pub refresh_token_expire_minutes: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Signing secret for the session cookie. Same rule as `jwt_secret`.
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_session_max_age")]
    pub max_age_seconds: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    /// Base URL of the settings service hosting `/refresh`
    pub settings_url: String,
    /// Base URL of the Python trading backend
    pub py_url: String,
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_access_expire_minutes() -> u64 {
    10
}

fn default_refresh_expire_minutes() -> u64 {
    10080
}

fn default_session_max_age() -> i64 {
    3600 * 24
}

fn default_allowed_origin() -> String {
    "http://localhost:5173".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Legacy environment variables (JWT_SECRET, COOKIE_SECRET, ...)
    /// 2. Prefixed environment variables (ALPHAWING__SERVER__PORT, etc.)
    /// 3. Config file specified by path
    /// 4. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = builder
            .set_default("environment", "development")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("services.settings_url", "http://localhost:5000")?
            .set_default("services.py_url", "http://localhost:8000")?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("ALPHAWING")
                .separator("__")
                .try_parsing(true),
        );

        // Legacy environment variables carried over from the node gateway
        if let Ok(jwt_secret) = env::var("JWT_SECRET") {
            builder = builder.set_override("auth.jwt_secret", jwt_secret)?;
        }
        if let Ok(cookie_secret) = env::var("COOKIE_SECRET") {
            builder = builder.set_override("session.secret", cookie_secret)?;
        }
        if let Some(minutes) = parse_env_u64("ACCESS_TOKEN_EXPIRE_MINUTES") {
            builder = builder.set_override("auth.access_token_expire_minutes", minutes)?;
        }
        if let Some(minutes) = parse_env_u64("REFRESH_TOKEN_EXPIRE_MINUTES") {
            builder = builder.set_override("auth.refresh_token_expire_minutes", minutes)?;
        }
        if let Some(port) = parse_env_u64("API_PORT") {
            builder = builder.set_override("server.port", port)?;
        }
        if let Ok(node_env) = env::var("NODE_ENV") {
            if node_env.eq_ignore_ascii_case("production") {
                builder = builder.set_override("environment", "production")?;
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration. Secrets are mandatory: a missing or weak
    /// signing secret refuses to boot instead of degrading silently.
    pub fn validate(&self) -> Result<(), String> {
        if self.auth.jwt_secret.len() < 32 {
            return Err("auth.jwt_secret must be set and at least 32 characters long".to_string());
        }
        if self.session.secret.len() < 32 {
            return Err("session.secret must be set and at least 32 characters long".to_string());
        }
        if self.server.port == 0 {
            return Err("server.port must be greater than 0".to_string());
        }
        if self.auth.access_token_expire_minutes == 0 || self.auth.refresh_token_expire_minutes == 0
        {
            return Err("token expiry minutes must be greater than 0".to_string());
        }
        if self.http.timeout_seconds == 0 {
            return Err("http.timeout_seconds must be greater than 0".to_string());
        }
        for (name, url) in [
            ("services.settings_url", &self.services.settings_url),
            ("services.py_url", &self.services.py_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("{name} must be an http(s) URL"));
            }
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
