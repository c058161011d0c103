//! JWT token generation and validation

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::AuthConfig;

/// Account role carried in token claims and the session payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Demo,
    Client,
    Admin,
    Service,
}

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID
    pub id: i64,
    /// Account role
    pub role: Role,
    /// Issued at (UTC timestamp)
    pub iat: u64,
    /// Expiration (UTC timestamp)
    pub exp: u64,
}

/// Access/refresh token pair minted from one identity
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Mint an access/refresh token pair for a user
///
/// Both tokens carry the same `{id, role}` claims and differ only in
/// expiration. A signing failure is fatal and must propagate.
pub fn issue_token_pair(id: i64, role: Role, config: &AuthConfig) -> anyhow::Result<TokenPair> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

    let access_token = sign(
        id,
        role,
        now,
        config.access_token_expire_minutes * 60,
        &config.jwt_secret,
    )?;
    let refresh_token = sign(
        id,
        role,
        now,
        config.refresh_token_expire_minutes * 60,
        &config.jwt_secret,
    )?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

fn sign(
    id: i64,
    role: Role,
    now: u64,
    lifetime_seconds: u64,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        id,
        role,
        iat: now,
        exp: now + lifetime_seconds,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validate and decode a token (signature and expiration)
pub fn validate_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let validation = Validation::default();

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}
