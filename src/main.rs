//! Portal entry point.

use anyhow::Context;
use auth_portal::config::{AppConfig, PolicyStore};
use auth_portal::{app, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let policy = config
        .redirect
        .build_policy()
        .context("Invalid redirect policy")?;

    info!(
        domains = %config.redirect.protected_domains.join(", "),
        "Redirect policy loaded"
    );

    let state = AppState {
        policy: PolicyStore::new(policy),
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Portal listening on {addr}");

    axum::serve(listener, app(state))
        .await
        .context("Server error")?;

    Ok(())
}
