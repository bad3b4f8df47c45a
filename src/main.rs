use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use unichat_client::{config::Config, routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        // Not fatal, the environment may already be set
        eprintln!("No .env file loaded: {}", e);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env()?;
    match &config.webhook_url {
        Some(url) => info!("Chat webhook: {}", url),
        None => warn!("CHAT_WEBHOOK_URL is not set, every send will fail until it is configured"),
    }

    let bind_addr = config.bind_addr.clone();
    let static_dir = config.static_dir.clone();
    let state = Arc::new(AppState::new(config));

    // Idle chat views expire like closed browser tabs.
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(60));
        loop {
            tick.tick().await;
            let removed = sessions.purge_expired().await;
            if removed > 0 {
                info!("Purged {} idle chat sessions", removed);
            }
        }
    });

    let app = routes::create_router()
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
        .layer(CorsLayer::very_permissive());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("UniChat client listening on http://{}", bind_addr);

    tokio::select! {
        res = axum::serve(listener, app) => res?,
        _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, shutting down..."),
    }

    Ok(())
}
