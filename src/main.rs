use anyhow::Context;
use cryptoinfo_backend::{AppState, config::Config, routes::app_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cryptoinfo_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    let config = Config::from_env()?;

    if config.gnews_api_key.is_none() {
        tracing::warn!("GNEWS_API_KEY is not set; /api/news will answer 500");
    }

    let bind_addr = config.bind_addr;
    let state = AppState::from_config(config).context("Failed to build HTTP clients")?;
    let app = app_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
