use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use codespher_chat::{config::AppConfig, routes, state::AppState, storage::FileStore};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("loading configuration")?;
    let store = FileStore::open(&config.data_dir)
        .with_context(|| format!("opening data dir {}", config.data_dir.display()))?;
    info!(dir = %store.dir().display(), "storage ready");

    let state = Arc::new(AppState::with_openai(&config, Arc::new(store)));

    // Drop idle sessions (and their drafts) in the background.
    let sessions = state.sessions.clone();
    let ttl = config.session_ttl;
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(ttl.clamp(Duration::from_secs(1), Duration::from_secs(300)));
        loop {
            tick.tick().await;
            let removed = sessions.purge_expired().await;
            if removed > 0 {
                info!(removed, "purged idle sessions");
            }
        }
    });

    let app = routes::create_router(state).layer(CorsLayer::very_permissive());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;

    info!("chat assistant running at http://{}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
