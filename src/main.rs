use axum::routing::{get, post};
use axum::Router;
use tracing_subscriber::EnvFilter;

use stylist_search::api;
use stylist_search::config::Config;
use stylist_search::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("LLM provider: {} ({})", config.llm.provider, config.llm.endpoint);
    tracing::info!(
        "Catalog: {} / {}",
        config.catalog.chroma_url,
        config.catalog.collection
    );

    let state = AppState::new(config.clone())?;

    let app = Router::new()
        .route("/api/recommend", post(api::recommend::recommend))
        .route("/api/health", get(api::recommend::health))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
