use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub magic_link: MagicLinkConfig,
    pub directory: DirectoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

/// Magic-link signing parameters.
///
/// `salt` has no preset in any environment; it must come from
/// `MAGIC_LINK_SALT`. An empty salt or missing TTL is rejected when the codec
/// is built.
#[derive(Clone, Serialize, Deserialize)]
pub struct MagicLinkConfig {
    pub salt: String,
    pub expire_hours: Option<u32>,
    pub portal_url: String,
}

impl std::fmt::Debug for MagicLinkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MagicLinkConfig")
            .field("salt", &"[REDACTED]")
            .field("expire_hours", &self.expire_hours)
            .field("portal_url", &self.portal_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// JSON file seeding the in-memory customer directory
    pub customer_file: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("MAGIC_LINK_SALT is not configured")]
    MissingSalt,
    #[error("MAGIC_LINK_EXPIRE_HOURS is not configured")]
    MissingExpireHours,
    #[error("JWT_SECRET is not configured")]
    MissingJwtSecret,
    #[error("SECURITY_JWT_EXPIRY_HOURS is out of range: {0}")]
    InvalidJwtExpiry(u64),
    #[error("Invalid portal URL '{0}'")]
    InvalidPortalUrl(String),
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Some(v) = env::var("PORTAL_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        // Magic link overrides
        if let Ok(v) = env::var("MAGIC_LINK_SALT") {
            self.magic_link.salt = v;
        }
        if let Ok(v) = env::var("MAGIC_LINK_EXPIRE_HOURS") {
            self.magic_link.expire_hours = v.parse().ok().or(self.magic_link.expire_hours);
        }
        if let Ok(v) = env::var("PORTAL_URL") {
            self.magic_link.portal_url = v;
        }

        if let Ok(v) = env::var("CUSTOMER_DIRECTORY_FILE") {
            self.directory.customer_file = Some(v);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                port: 3000,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            magic_link: MagicLinkConfig {
                salt: String::new(),
                expire_hours: Some(24),
                portal_url: "http://localhost:5173/magic-link".to_string(),
            },
            directory: DirectoryConfig { customer_file: None },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                port: 8080,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
            magic_link: MagicLinkConfig {
                salt: String::new(),
                expire_hours: Some(24),
                portal_url: "https://staging.example.com/magic-link".to_string(),
            },
            directory: DirectoryConfig { customer_file: None },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                port: 8080,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
            },
            magic_link: MagicLinkConfig {
                salt: String::new(),
                // Production must state its TTL explicitly
                expire_hours: None,
                portal_url: "https://app.example.com/magic-link".to_string(),
            },
            directory: DirectoryConfig { customer_file: None },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
