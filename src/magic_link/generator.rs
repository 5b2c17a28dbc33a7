use std::sync::Arc;

use serde::Serialize;
use url::Url;

use crate::config::{ConfigError, MagicLinkConfig};
use crate::customer::{CustomerDirectory, DirectoryError, OfficeDirectory};

use super::codec::MagicLinkCodec;

#[derive(Debug, thiserror::Error)]
pub enum MagicLinkError {
    #[error("No active account found for {0}")]
    AccountNotFound(String),
    #[error("Customer lookup failed: {0}")]
    Directory(#[from] DirectoryError),
}

/// Issued link handed back to the caller
#[derive(Debug, Clone, Serialize)]
pub struct MagicLink {
    pub token: String,
    pub url: String,
    pub expires_at: i64,
}

/// Issues magic-link tokens for emails that belong to an active customer.
///
/// Account existence is checked here only; redeeming a token does not go
/// back to the directory.
pub struct MagicLinkGenerator {
    codec: Arc<MagicLinkCodec>,
    offices: Arc<dyn OfficeDirectory>,
    customers: Arc<dyn CustomerDirectory>,
    portal_url: Url,
}

impl MagicLinkGenerator {
    pub fn new(
        config: &MagicLinkConfig,
        codec: Arc<MagicLinkCodec>,
        offices: Arc<dyn OfficeDirectory>,
        customers: Arc<dyn CustomerDirectory>,
    ) -> Result<Self, ConfigError> {
        let portal_url = Url::parse(&config.portal_url)
            .map_err(|_| ConfigError::InvalidPortalUrl(config.portal_url.clone()))?;

        Ok(Self {
            codec,
            offices,
            customers,
            portal_url,
        })
    }

    pub fn codec(&self) -> &MagicLinkCodec {
        &self.codec
    }

    /// Token for `email`, or `AccountNotFound` when no office has an active
    /// customer with that address
    pub async fn generate(&self, email: &str, hours: Option<u32>) -> Result<String, MagicLinkError> {
        self.issue(email, hours).await.map(|(token, _)| token)
    }

    /// Same gate as [`generate`](Self::generate), returning the shareable URL
    pub async fn link(&self, email: &str, hours: Option<u32>) -> Result<MagicLink, MagicLinkError> {
        let (token, expires_at) = self.issue(email, hours).await?;

        let mut url = self.portal_url.clone();
        url.query_pairs_mut().append_pair("t", &token);

        Ok(MagicLink {
            token,
            url: url.to_string(),
            expires_at,
        })
    }

    async fn issue(&self, email: &str, hours: Option<u32>) -> Result<(String, i64), MagicLinkError> {
        let office_ids = self.offices.office_ids().await?;
        let matches = self.customers.search_active_by_email(email, &office_ids).await?;

        if matches.is_empty() {
            tracing::info!("Magic link refused: no active account across {} offices", office_ids.len());
            return Err(MagicLinkError::AccountNotFound(email.to_string()));
        }

        tracing::debug!("Issuing magic link for customer {}", matches[0].id);
        Ok(self.codec.encode_with_expiry(email, hours))
    }
}
