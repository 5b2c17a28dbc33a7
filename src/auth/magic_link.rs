use std::sync::Arc;

use axum::http::HeaderMap;

use crate::magic_link::MagicLinkCodec;

use super::{bearer_token, AuthMethod, AuthUser, Guard, GuardError};

/// Accepts magic-link tokens sent as bearer credentials.
///
/// Only consulted when the request asks for it through `X-Auth-Type`. The
/// token itself is the proof; the customer directory is not queried.
pub struct MagicLinkGuard {
    codec: Arc<MagicLinkCodec>,
}

impl MagicLinkGuard {
    pub fn new(codec: Arc<MagicLinkCodec>) -> Self {
        Self { codec }
    }
}

impl Guard for MagicLinkGuard {
    fn name(&self) -> &'static str {
        "magic_link"
    }

    fn applies(&self, headers: &HeaderMap) -> bool {
        matches!(AuthMethod::requested(headers), Some(Ok(AuthMethod::MagicLink)))
    }

    fn resolve_user(&self, headers: &HeaderMap) -> Result<AuthUser, GuardError> {
        let payload = self
            .codec
            .decode(bearer_token(headers)?)
            .map_err(GuardError::MagicLink)?;

        Ok(AuthUser {
            email: payload.email,
            method: AuthMethod::MagicLink,
            subject: None,
            expires_at: payload.expires_at,
        })
    }
}
