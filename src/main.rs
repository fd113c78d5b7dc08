use axum::{extract::DefaultBodyLimit, Router};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use friendzoned::config::{sentiment::SentimentConfig, server::ServerConfig};
use friendzoned::modules;
use friendzoned::services::sentiment::SentimentClient;
use friendzoned::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let server = ServerConfig::from_env()?;
    let sentiment_config = SentimentConfig::from_env()?;
    let sentiment = SentimentClient::new(&sentiment_config)?;

    info!("Sentiment engine: {}", sentiment.url());

    let state = AppState { sentiment };

    let app = Router::new()
        .merge(modules::analysis::routes::routes())
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(server.bind_addr()).await?;
    info!("Server running on http://{}", server.bind_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
