// auth/mod.rs - Request-scoped customer authentication
//
// Each inbound request is offered to a fixed, ordered list of guards. A guard
// first says whether it applies (based on the X-Auth-Type discriminator) and
// then tries to turn the request credentials into an AuthUser.

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::magic_link::ValidationError;

pub mod chain;
pub mod jwt;
pub mod magic_link;

pub use chain::GuardChain;
pub use jwt::{Claims, JwtError, JwtGuard};
pub use magic_link::MagicLinkGuard;

/// Header selecting which guard should handle the request
pub const AUTH_TYPE_HEADER: &str = "x-auth-type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    Jwt,
    MagicLink,
}

impl AuthMethod {
    /// Read the discriminator header. `None` when the header is absent.
    pub fn requested(headers: &HeaderMap) -> Option<Result<Self, String>> {
        let raw = headers.get(AUTH_TYPE_HEADER)?;
        let value = raw.to_str().unwrap_or_default().trim().to_ascii_lowercase();

        Some(match value.as_str() {
            "jwt" => Ok(AuthMethod::Jwt),
            "magic-link" | "magiclink" | "magic_link" => Ok(AuthMethod::MagicLink),
            _ => Err(value),
        })
    }
}

/// Authenticated customer attached to the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub email: String,
    pub method: AuthMethod,
    /// Identity provider subject, when the credential carries one
    pub subject: Option<String>,
    pub expires_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("Missing Authorization header")]
    MissingCredentials,

    #[error("{0}")]
    MalformedHeader(&'static str),

    #[error("Unsupported auth type '{0}'")]
    UnsupportedAuthType(String),

    #[error("Invalid JWT token: {0}")]
    InvalidJwt(String),

    #[error("{0}")]
    MagicLink(ValidationError),
}

/// One way of resolving the current user from request headers
pub trait Guard: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this guard should look at the request at all
    fn applies(&self, headers: &HeaderMap) -> bool;

    fn resolve_user(&self, headers: &HeaderMap) -> Result<AuthUser, GuardError>;
}

/// Extract the bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, GuardError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(GuardError::MissingCredentials)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| GuardError::MalformedHeader("Invalid Authorization header format"))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or(GuardError::MalformedHeader("Authorization header must use Bearer token format"))?
        .trim();

    if token.is_empty() {
        return Err(GuardError::MalformedHeader("Empty bearer token"));
    }

    Ok(token)
}
