//! Authentication building blocks
//!
//! Token issuing/validation and request identity resolution. Session cookie
//! handling lives in [`crate::session`].

pub mod identity;
pub mod jwt;

pub use identity::{Identity, resolve_identity};
pub use jwt::{Claims, Role, TokenPair, issue_token_pair, validate_token};
