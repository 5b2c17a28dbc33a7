// customer/mod.rs - Account lookup collaborators
//
// The portal never owns customer records; they live in the upstream
// field-service system. Link issuance only needs two questions answered:
// which offices exist, and which active customers in those offices use a
// given email address.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub office_id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Directory unavailable: {0}")]
    Unavailable(String),
    #[error("Failed to read customer file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid customer file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Lists the offices a customer search should span
#[async_trait]
pub trait OfficeDirectory: Send + Sync {
    async fn office_ids(&self) -> Result<Vec<i64>, DirectoryError>;
}

/// Searches customer accounts
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Active customers whose email matches, restricted to `office_ids`
    async fn search_active_by_email(
        &self,
        email: &str,
        office_ids: &[i64],
    ) -> Result<Vec<Customer>, DirectoryError>;
}

/// Process-local directory used by the standalone server and tests.
///
/// Office ids are derived from the loaded customers. Emails match
/// case-insensitively.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    customers: RwLock<Vec<Customer>>,
}

impl InMemoryDirectory {
    pub fn new(customers: Vec<Customer>) -> Self {
        Self {
            customers: RwLock::new(customers),
        }
    }

    /// Load a JSON array of customers
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let raw = std::fs::read_to_string(path)?;
        let customers: Vec<Customer> = serde_json::from_str(&raw)?;
        Ok(Self::new(customers))
    }

    pub fn len(&self) -> usize {
        self.customers.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OfficeDirectory for InMemoryDirectory {
    async fn office_ids(&self) -> Result<Vec<i64>, DirectoryError> {
        let customers = self
            .customers
            .read()
            .map_err(|_| DirectoryError::Unavailable("customer store poisoned".to_string()))?;

        let offices: BTreeSet<i64> = customers.iter().map(|c| c.office_id).collect();
        Ok(offices.into_iter().collect())
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryDirectory {
    async fn search_active_by_email(
        &self,
        email: &str,
        office_ids: &[i64],
    ) -> Result<Vec<Customer>, DirectoryError> {
        let customers = self
            .customers
            .read()
            .map_err(|_| DirectoryError::Unavailable("customer store poisoned".to_string()))?;

        Ok(customers
            .iter()
            .filter(|c| c.active)
            .filter(|c| office_ids.contains(&c.office_id))
            .filter(|c| c.email.eq_ignore_ascii_case(email))
            .cloned()
            .collect())
    }
}
