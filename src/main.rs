use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use lavender_garden::core::config::{AppPaths, ConfigService};
use lavender_garden::core::logging;
use lavender_garden::server;
use lavender_garden::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    let config = ConfigService::new(paths.clone())
        .load()
        .context("Failed to load configuration")?;
    logging::init(&paths);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let idle_ttl_secs = config.session.idle_ttl_secs;

    let state = AppState::initialize(&paths, config)
        .await
        .context("Failed to initialize application state")?;

    if idle_ttl_secs > 0 {
        spawn_session_pruner(state.clone(), Duration::from_secs(idle_ttl_secs));
    }

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    println!("LAVENDER_ADDR=http://{}", addr);
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

fn spawn_session_pruner(state: Arc<AppState>, ttl: Duration) {
    let period = (ttl / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let dropped = state.sessions.prune_idle(ttl);
            if dropped > 0 {
                tracing::info!("Dropped {} idle chat sessions", dropped);
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
