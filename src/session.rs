//! Signed session cookie store
//!
//! The session is a single cookie named `remix` holding the user's profile
//! fields and token pair as base64url JSON under a `user` key, signed with the
//! cookie secret. A session is either fully absent or fully valid: any parse
//! or signature failure reads back as absence, and writes always replace the
//! whole payload.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use cookie::{Cookie, CookieJar, Key, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::auth::Role;
use crate::config::SessionConfig;

pub const SESSION_COOKIE_NAME: &str = "remix";

/// Session cookie payload. Field names stay camelCase on the wire to match
/// the refresh/login response bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub role: Role,
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
    pub email: String,
}

#[derive(Serialize, Deserialize)]
struct SessionEnvelope {
    user: SessionUser,
}

#[derive(Clone)]
pub struct SessionStore {
    key: Key,
    secure: bool,
    same_site: SameSite,
    max_age: Duration,
}

impl SessionStore {
    /// Build a store from config. `Config::validate` guarantees a secret of
    /// at least 32 bytes, which `Key::derive_from` requires.
    pub fn new(config: &SessionConfig, environment: &str) -> Self {
        let production = environment == "production";
        Self {
            key: Key::derive_from(config.secret.as_bytes()),
            secure: production,
            same_site: if production {
                SameSite::Lax
            } else {
                SameSite::None
            },
            max_age: Duration::seconds(config.max_age_seconds),
        }
    }

    /// Read the session out of a request `Cookie` header. Missing, malformed,
    /// or signature-invalid cookies are absence, never an error.
    pub fn read(&self, cookie_header: Option<&str>) -> Option<SessionUser> {
        let header = cookie_header?;
        let raw = Cookie::split_parse(header.to_owned())
            .filter_map(Result::ok)
            .find(|c| c.name() == SESSION_COOKIE_NAME)?;
        self.read_value(raw.value())
    }

    /// Verify and decode a raw session cookie value
    pub fn read_value(&self, value: &str) -> Option<SessionUser> {
        let mut jar = CookieJar::new();
        jar.add_original(Cookie::new(SESSION_COOKIE_NAME, value.to_owned()));
        let verified = jar.signed(&self.key).get(SESSION_COOKIE_NAME)?;

        let bytes = URL_SAFE_NO_PAD.decode(verified.value()).ok()?;
        let envelope: SessionEnvelope = serde_json::from_slice(&bytes).ok()?;
        Some(envelope.user)
    }

    /// Serialize, sign, and render a full `Set-Cookie` value for the payload
    pub fn write(&self, user: &SessionUser) -> Result<String, serde_json::Error> {
        let value = self.sign_value(user)?;
        Ok(self.build_cookie(value).to_string())
    }

    /// Render a `Cookie` request header pair (`remix=<value>`) for the
    /// payload, used when retrying a relayed call with a fresh session
    pub fn cookie_pair(&self, user: &SessionUser) -> Result<String, serde_json::Error> {
        let value = self.sign_value(user)?;
        Ok(format!("{SESSION_COOKIE_NAME}={value}"))
    }

    /// Render a `Set-Cookie` value that removes the session
    pub fn destroy(&self) -> String {
        let mut cookie = self.build_cookie(String::new());
        cookie.set_max_age(Duration::ZERO);
        cookie.to_string()
    }

    fn sign_value(&self, user: &SessionUser) -> Result<String, serde_json::Error> {
        let payload = serde_json::to_vec(&SessionEnvelope { user: user.clone() })?;
        let encoded = URL_SAFE_NO_PAD.encode(payload);

        // HMAC signing is deterministic, so write() and cookie_pair() agree
        // on the value for the same payload.
        let mut jar = CookieJar::new();
        jar.signed_mut(&self.key)
            .add(Cookie::new(SESSION_COOKIE_NAME, encoded));
        let signed = jar
            .get(SESSION_COOKIE_NAME)
            .map(|c| c.value().to_owned())
            .unwrap_or_default();
        Ok(signed)
    }

    fn build_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(self.max_age)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> SessionStore {
        SessionStore::new(
            &SessionConfig {
                secret: "test-cookie-secret-at-least-32-chars".to_string(),
                max_age_seconds: 86400,
            },
            "development",
        )
    }

    fn test_user() -> SessionUser {
        SessionUser {
            role: Role::Client,
            username: "x".to_string(),
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            email: "x@y.com".to_string(),
        }
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let store = test_store();
        let user = test_user();

        let header = store.cookie_pair(&user).unwrap();
        let read = store.read(Some(&header)).unwrap();
        assert_eq!(read, user);
    }

    #[test]
    fn test_set_cookie_attributes() {
        let store = test_store();
        let set_cookie = store.write(&test_user()).unwrap();

        assert!(set_cookie.starts_with("remix="));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("Path=/"));
        assert!(set_cookie.contains("Max-Age=86400"));
        // Development keeps the original gateway's SameSite=None, no Secure
        assert!(set_cookie.contains("SameSite=None"));
        assert!(!set_cookie.contains("Secure"));
    }

    #[test]
    fn test_production_cookie_is_secure_lax() {
        let store = SessionStore::new(
            &SessionConfig {
                secret: "test-cookie-secret-at-least-32-chars".to_string(),
                max_age_seconds: 86400,
            },
            "production",
        );
        let set_cookie = store.write(&test_user()).unwrap();
        assert!(set_cookie.contains("Secure"));
        assert!(set_cookie.contains("SameSite=Lax"));
    }

    #[test]
    fn test_missing_and_malformed_cookies_are_absence() {
        let store = test_store();
        assert!(store.read(None).is_none());
        assert!(store.read(Some("theme=dark")).is_none());
        assert!(store.read(Some("remix=!!not-base64url!!")).is_none());
        assert!(store.read(Some("not a cookie header at all")).is_none());
    }

    #[test]
    fn test_tampered_value_fails_signature() {
        let store = test_store();
        let pair = store.cookie_pair(&test_user()).unwrap();

        let mut tampered = pair.clone();
        tampered.push('A');
        assert!(store.read(Some(&tampered)).is_none());
    }

    #[test]
    fn test_wrong_key_fails_signature() {
        let store = test_store();
        let other = SessionStore::new(
            &SessionConfig {
                secret: "a-completely-different-32-char-key!!".to_string(),
                max_age_seconds: 86400,
            },
            "development",
        );

        let pair = store.cookie_pair(&test_user()).unwrap();
        assert!(other.read(Some(&pair)).is_none());
    }

    #[test]
    fn test_destroy_clears_session_atomically() {
        let store = test_store();
        let cleared = store.destroy();

        assert!(cleared.contains("Max-Age=0"));

        // Reading back the cleared cookie yields nothing, not a partial user
        let raw_value = cleared.split(';').next().unwrap().to_owned();
        assert!(store.read(Some(&raw_value)).is_none());
    }
}
