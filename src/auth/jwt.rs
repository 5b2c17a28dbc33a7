use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SecurityConfig};

use super::{bearer_token, AuthMethod, AuthUser, Guard, GuardError};

/// Claims carried by identity-provider access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// `exp` saturates at `i64::MAX` when the lifetime overflows the calendar
    pub fn new(sub: impl Into<String>, email: impl Into<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = expires_after(now, expiry_hours).map_or(i64::MAX, |at| at.timestamp());

        Self {
            sub: sub.into(),
            email: email.into(),
            exp,
            iat: now.timestamp(),
        }
    }
}

fn expires_after(now: DateTime<Utc>, hours: u64) -> Option<DateTime<Utc>> {
    let lifetime = Duration::try_hours(i64::try_from(hours).ok()?)?;
    now.checked_add_signed(lifetime)
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(#[from] jsonwebtoken::errors::Error),
}

/// HS256 bearer-token guard
pub struct JwtGuard {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: u64,
}

impl JwtGuard {
    pub fn new(config: &SecurityConfig) -> Result<Self, ConfigError> {
        if config.jwt_secret.is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        if expires_after(Utc::now(), config.jwt_expiry_hours).is_none() {
            return Err(ConfigError::InvalidJwtExpiry(config.jwt_expiry_hours));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            expiry_hours: config.jwt_expiry_hours,
        })
    }

    /// Mint a token for `sub` / `email` using the configured lifetime
    pub fn issue(&self, sub: &str, email: &str) -> Result<String, JwtError> {
        self.sign(&Claims::new(sub, email, self.expiry_hours))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        Ok(encode(&Header::default(), claims, &self.encoding_key)?)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, GuardError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| GuardError::InvalidJwt(e.to_string()))?;

        Ok(token_data.claims)
    }
}

impl Guard for JwtGuard {
    fn name(&self) -> &'static str {
        "jwt"
    }

    /// Default guard: used when no discriminator is sent
    fn applies(&self, headers: &HeaderMap) -> bool {
        matches!(AuthMethod::requested(headers), None | Some(Ok(AuthMethod::Jwt)))
    }

    fn resolve_user(&self, headers: &HeaderMap) -> Result<AuthUser, GuardError> {
        let claims = self.validate(bearer_token(headers)?)?;

        Ok(AuthUser {
            email: claims.email,
            method: AuthMethod::Jwt,
            subject: Some(claims.sub),
            expires_at: claims.exp,
        })
    }
}
