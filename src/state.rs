use std::sync::Arc;

use crate::auth::{GuardChain, JwtGuard, MagicLinkGuard};
use crate::clock::Clock;
use crate::config::{AppConfig, ConfigError};
use crate::customer::{CustomerDirectory, OfficeDirectory};
use crate::magic_link::{MagicLinkCodec, MagicLinkGenerator};

/// Shared handles injected into every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<MagicLinkGenerator>,
    pub guards: Arc<GuardChain>,
}

impl AppState {
    /// Wire codec, generator and guards from configuration.
    ///
    /// Fails when signing secrets or the default TTL are missing; callers
    /// treat that as fatal.
    pub fn build(
        config: &AppConfig,
        clock: Arc<dyn Clock>,
        offices: Arc<dyn OfficeDirectory>,
        customers: Arc<dyn CustomerDirectory>,
    ) -> Result<Self, ConfigError> {
        let codec = Arc::new(MagicLinkCodec::new(&config.magic_link, clock)?);
        let generator = MagicLinkGenerator::new(&config.magic_link, codec.clone(), offices, customers)?;

        // Priority order: identity-provider JWT first, then magic link
        let guards = GuardChain::new()
            .with(Arc::new(JwtGuard::new(&config.security)?))
            .with(Arc::new(MagicLinkGuard::new(codec)));

        Ok(Self {
            generator: Arc::new(generator),
            guards: Arc::new(guards),
        })
    }
}
