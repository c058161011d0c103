//! Backend relay client
//!
//! Forwards a caller's request to one of the configured backend services with
//! their cookies attached, and transparently recovers once from an expired
//! access token: on a 401 it calls the settings service's `/refresh`, mints a
//! fresh session cookie from the response, retries the original call with the
//! new cookie, and hands the `Set-Cookie` value back to the caller to relay
//! to the browser. Exactly one retry, no backoff, no retry of retries.
//!
//! Concurrent requests that both hit a 401 will each refresh independently;
//! the last session write wins. Tokens are idempotent bearer credentials so
//! this is harmless, and the source system behaves the same way.

use reqwest::{Client, Method, StatusCode, header};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::session::{SessionStore, SessionUser};

/// Named backend services the relay can address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Node/settings service, also hosts `/refresh`
    Settings,
    /// Python trading backend
    Py,
}

#[derive(Debug, Error)]
pub enum RelayError {
    /// Refresh was rejected; the caller must send the user back to login
    #[error("session refresh rejected, login required")]
    RedirectToLogin,

    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("session cookie could not be encoded: {0}")]
    Session(#[from] serde_json::Error),
}

/// Outcome of a relayed call
#[derive(Debug)]
pub struct RelayResponse {
    pub success: bool,
    pub status: StatusCode,
    pub data: Value,
    /// `Set-Cookie` value for the renewed session, present only when the
    /// refresh path ran. The caller attaches it to its own response.
    pub cookie_header: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    settings_url: String,
    py_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &Config, session: SessionStore) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            settings_url: config.services.settings_url.clone(),
            py_url: config.services.py_url.clone(),
            session,
        })
    }

    /// Relay a call to a backend service on behalf of an inbound request
    pub async fn relay(
        &self,
        service: Service,
        method: Method,
        path: &str,
        cookie_header: Option<&str>,
        body: Option<&Value>,
    ) -> Result<RelayResponse, RelayError> {
        let url = self.endpoint(service, path);
        let res = self
            .request(&url, method.clone(), cookie_header, body)
            .send()
            .await?;
        let status = res.status();

        if status.is_success() {
            return Ok(RelayResponse {
                success: true,
                status,
                data: res.json().await?,
                cookie_header: None,
            });
        }

        if status == StatusCode::UNAUTHORIZED {
            // Access token expired: refresh with the same cookies, then retry
            // the original call once with the renewed session attached.
            let user = self.refresh(cookie_header).await?;
            let set_cookie = self.session.write(&user)?;
            let retry_cookie = self.session.cookie_pair(&user)?;

            let res = self
                .request(&url, method, Some(&retry_cookie), body)
                .send()
                .await?;
            let status = res.status();

            return Ok(RelayResponse {
                success: status.is_success(),
                status,
                data: res.json().await?,
                cookie_header: Some(set_cookie),
            });
        }

        // Any other failure passes through untouched, no retry
        Ok(RelayResponse {
            success: false,
            status,
            data: res.json().await?,
            cookie_header: None,
        })
    }

    /// Plain single call without the refresh-retry path (used for login,
    /// where a 401 means bad credentials, not an expired token)
    pub async fn call(
        &self,
        service: Service,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Value), RelayError> {
        let url = self.endpoint(service, path);
        let res = self.request(&url, method, None, body).send().await?;
        let status = res.status();
        Ok((status, res.json().await?))
    }

    /// Reachability probe for readiness checks: any HTTP response counts
    pub async fn ping(&self, service: Service) -> Result<(), reqwest::Error> {
        self.http
            .get(self.base_url(service))
            .send()
            .await
            .map(|_| ())
    }

    async fn refresh(&self, cookie_header: Option<&str>) -> Result<SessionUser, RelayError> {
        let mut req = self.http.post(self.endpoint(Service::Settings, "/refresh"));
        if let Some(cookie) = cookie_header {
            req = req.header(header::COOKIE, cookie);
        }

        let res = req.send().await?;
        if !res.status().is_success() {
            tracing::warn!(status = %res.status(), "session refresh rejected");
            return Err(RelayError::RedirectToLogin);
        }
        Ok(res.json().await?)
    }

    fn request(
        &self,
        url: &str,
        method: Method,
        cookie_header: Option<&str>,
        body: Option<&Value>,
    ) -> reqwest::RequestBuilder {
        let mutating = matches!(method, Method::POST | Method::PUT | Method::DELETE);
        let mut req = self.http.request(method, url);

        if let Some(cookie) = cookie_header {
            req = req.header(header::COOKIE, cookie);
        }
        if mutating {
            req = req.header(header::CONTENT_TYPE, "application/json");
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        req
    }

    fn base_url(&self, service: Service) -> &str {
        match service {
            Service::Settings => &self.settings_url,
            Service::Py => &self.py_url,
        }
    }

    fn endpoint(&self, service: Service, path: &str) -> String {
        let base = self.base_url(service).trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}
