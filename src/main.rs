use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use travel_aggregator::{app, AppConfig, AppState, Authenticator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "travel_aggregator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load config")?;

    if config.provider.client_id.is_none() || config.provider.client_secret.is_none() {
        tracing::warn!("Provider credentials are not configured, provider routes will fail");
    }
    if config.places.api_key.is_none() {
        tracing::warn!("Places API key is not configured, hotel enrichment is disabled");
    }

    let http = reqwest::Client::builder()
        .timeout(config.provider.timeout())
        .build()
        .context("Failed to build HTTP client")?;

    let tokens = Arc::new(Authenticator::new(http.clone(), &config.provider));
    let state = AppState::new(&config, http, tokens);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
