mod config;
mod room;
mod signaling;

pub use config::*;
pub use room::*;
pub use signaling::*;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

const RELAY_QUEUE_DEPTH: usize = 256;

pub struct AppState {
    pub signaling: SignalingService,
}

/// Spawns the relay task and returns the state the router needs to reach it.
pub fn start_relay(config: &ServerConfig) -> Arc<AppState> {
    let (relay_tx, relay_rx) = mpsc::channel(RELAY_QUEUE_DEPTH);
    let signaling = SignalingService::new(relay_tx, config.ice_servers.clone());

    let relay = Relay::new(relay_rx, Arc::new(signaling.clone()));
    tokio::spawn(relay.run());

    Arc::new(AppState { signaling })
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

pub async fn serve(config: ServerConfig) -> Result<()> {
    let state = start_relay(&config);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Signaling relay listening on ws://{}/ws", config.bind_addr);

    axum::serve(listener, app)
        .await
        .context("Signaling relay stopped")?;
    Ok(())
}
