use std::sync::Arc;

use axum::http::HeaderMap;

use super::{AuthMethod, AuthUser, Guard, GuardError};

/// Ordered set of guards tried for every protected request.
///
/// Guards that do not apply are skipped. The first guard that resolves a user
/// wins; if every applicable guard fails, the last failure is returned.
#[derive(Clone, Default)]
pub struct GuardChain {
    guards: Vec<Arc<dyn Guard>>,
}

impl GuardChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a guard at the lowest priority so far
    pub fn with(mut self, guard: Arc<dyn Guard>) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.guards.iter().map(|g| g.name()).collect()
    }

    pub fn resolve_user(&self, headers: &HeaderMap) -> Result<AuthUser, GuardError> {
        let mut last_error = None;

        for guard in self.guards.iter().filter(|g| g.applies(headers)) {
            match guard.resolve_user(headers) {
                Ok(user) => {
                    tracing::debug!("Request authenticated by {} guard", guard.name());
                    return Ok(user);
                }
                Err(e) => {
                    tracing::debug!("{} guard rejected request: {}", guard.name(), e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => match AuthMethod::requested(headers) {
                Some(Err(requested)) => Err(GuardError::UnsupportedAuthType(requested)),
                _ => Err(GuardError::MissingCredentials),
            },
        }
    }
}
