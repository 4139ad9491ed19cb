use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roadtrip::{
    api::{self, ServerConfig},
    state::AppState,
    store::StoreConfig,
    types::GameConfig,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roadtrip=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Roadtrip Challenge Picker...");

    let store = StoreConfig::from_env().build_store();
    let game_config = GameConfig::from_env();
    tracing::info!("Players: {}", game_config.players.join(", "));

    let state = Arc::new(AppState::new(store, game_config));

    // Initial load; on failure we start with an empty list
    if state.refresh().await.is_err() {
        tracing::warn!("Starting without challenges, the list will load on the next refresh");
    }

    let config = ServerConfig::from_env();
    let addr = config.addr;
    let app = api::app(state, &config);
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
