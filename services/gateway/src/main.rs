mod config;
mod error;
mod handlers;
mod router;
mod state;

use std::sync::Arc;

use config::GatewayConfig;
use matchmaker::{LogSink, Matchmaker};
use router::create_router;
use state::AppState;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = GatewayConfig::from_env()?;
    info!(config = %serde_json::to_string(&config)?, "Starting matchmaking gateway");

    let (matchmaker, dispatcher) = Matchmaker::start(config.match_config(), Arc::new(LogSink));
    let app = create_router(AppState::new(matchmaker.clone()));

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;

    info!("Listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    matchmaker.shutdown().cancel();
    dispatcher.await?;
    info!("Gateway stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
