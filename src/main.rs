use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use portal_auth::clock::SystemClock;
use portal_auth::customer::InMemoryDirectory;
use portal_auth::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up MAGIC_LINK_SALT, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = portal_auth::config::config();
    tracing::info!("Starting portal auth in {:?} mode", config.environment);

    let directory = match &config.directory.customer_file {
        Some(path) => {
            let directory = InMemoryDirectory::from_file(path)
                .with_context(|| format!("failed to load customer directory from {}", path))?;
            if directory.is_empty() {
                tracing::warn!("{} contains no customers; every magic link request will be refused", path);
            } else {
                tracing::info!("Loaded {} customers from {}", directory.len(), path);
            }
            Arc::new(directory)
        }
        None => {
            tracing::warn!("CUSTOMER_DIRECTORY_FILE not set; every magic link request will be refused");
            Arc::new(InMemoryDirectory::default())
        }
    };

    // Missing secrets or TTL stop the process here
    let state = AppState::build(config, Arc::new(SystemClock), directory.clone(), directory)
        .context("invalid authentication configuration")?;
    tracing::info!(
        "Guard order: {:?}; magic links default to {}h",
        state.guards.names(),
        state.generator.codec().expire_hours()
    );

    let app = app(state, config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Portal auth listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
