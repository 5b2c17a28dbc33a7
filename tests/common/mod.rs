#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};

use portal_auth::auth::JwtGuard;
use portal_auth::clock::{Clock, FixedClock};
use portal_auth::config::{
    ApiConfig, AppConfig, DirectoryConfig, Environment, MagicLinkConfig, SecurityConfig,
};
use portal_auth::customer::{Customer, InMemoryDirectory};
use portal_auth::{app, AppState};

pub const JWT_SECRET: &str = "integration-jwt-secret";
pub const SALT: &str = "integration-salt";

pub struct TestServer {
    pub base_url: String,
    pub clock: Arc<FixedClock>,
    pub config: AppConfig,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Guard sharing the server's JWT secret, for minting bearer tokens
    pub fn jwt(&self) -> Result<JwtGuard> {
        Ok(JwtGuard::new(&self.config.security)?)
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        api: ApiConfig { port: 0 },
        security: SecurityConfig {
            enable_cors: false,
            cors_origins: vec![],
            jwt_secret: JWT_SECRET.to_string(),
            jwt_expiry_hours: 1,
        },
        magic_link: MagicLinkConfig {
            salt: SALT.to_string(),
            expire_hours: Some(24),
            portal_url: "https://portal.test/magic-link".to_string(),
        },
        directory: DirectoryConfig { customer_file: None },
    }
}

pub fn customer(id: i64, office_id: i64, email: &str, active: bool) -> Customer {
    Customer {
        id,
        office_id,
        email: email.to_string(),
        first_name: "Pat".to_string(),
        last_name: "Customer".to_string(),
        active,
    }
}

/// Serve the app in-process on an ephemeral port
pub async fn spawn_server(customers: Vec<Customer>) -> Result<TestServer> {
    let config = test_config();
    let clock = Arc::new(FixedClock::new(chrono::Utc::now().timestamp()));
    let directory = Arc::new(InMemoryDirectory::new(customers));

    let state = AppState::build(&config, clock.clone(), directory.clone(), directory)
        .context("failed to build app state")?;
    let router = app(state, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        clock,
        config,
    })
}

/// Issue a magic link through the public endpoint and return its token
pub async fn issue_token(server: &TestServer, email: &str, hours: Option<u32>) -> Result<String> {
    let res = reqwest::Client::new()
        .post(server.url("/auth/magic-link"))
        .json(&serde_json::json!({ "email": email, "hours": hours }))
        .send()
        .await?
        .error_for_status()?;

    let body = res.json::<serde_json::Value>().await?;
    body["data"]["token"]
        .as_str()
        .map(str::to_string)
        .context("response carried no token")
}
