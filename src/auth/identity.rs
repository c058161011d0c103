//! Best-effort identity resolution for inbound requests
//!
//! Precedence is fixed and cookie identity always wins over header identity:
//! 1. `remix` session cookie (legacy Remix shape, signed) — present but
//!    unreadable short-circuits to the anonymous identity
//! 2. dedicated `accessToken`/`refreshToken` cookie pair
//! 3. `Authorization: Bearer <token>` header, claims left to the backend
//! 4. anonymous

use axum::http::{HeaderMap, header};
use axum_extra::extract::CookieJar;

use crate::auth::jwt::{Claims, validate_token};
use crate::session::{SESSION_COOKIE_NAME, SessionStore};

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Tokens and claims resolved for one request. All fields may be absent;
/// downstream code must handle the anonymous identity.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub claims: Option<Claims>,
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        self.access_token.is_none()
    }
}

pub fn resolve_identity(headers: &HeaderMap, store: &SessionStore, jwt_secret: &str) -> Identity {
    let jar = CookieJar::from_headers(headers);

    // Session cookie first. An unreadable one is anonymous, not an error,
    // and does not fall through to the other sources.
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        return match store.read_value(cookie.value()) {
            Some(user) => {
                let claims = validate_token(&user.access_token, jwt_secret).ok();
                Identity {
                    access_token: Some(user.access_token),
                    refresh_token: Some(user.refresh_token),
                    claims,
                }
            }
            None => Identity::default(),
        };
    }

    // Dedicated token cookie pair. Claims come from the access token when it
    // verifies; the raw tokens are kept either way.
    let access_cookie = jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_owned());
    let refresh_cookie = jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_owned());
    if access_cookie.is_some() || refresh_cookie.is_some() {
        let claims = access_cookie
            .as_deref()
            .and_then(|token| validate_token(token, jwt_secret).ok());
        return Identity {
            access_token: access_cookie,
            refresh_token: refresh_cookie,
            claims,
        };
    }

    // Bearer header last: token used verbatim, claims resolution deferred
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if let Some(token) = bearer {
        return Identity {
            access_token: Some(token.to_owned()),
            refresh_token: None,
            claims: None,
        };
    }

    Identity::default()
}
