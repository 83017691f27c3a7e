//! expensed - HTTP Server Entry Point
//!
//! Starts the HTTP server that exposes the expense tracking API and spawns
//! the scheduled report jobs.

use expensed::{api, config::Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expensed=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!("Starting server on {}:{}", config.host, config.port);

    api::serve(config).await?;

    Ok(())
}
