use std::net::SocketAddr;
use std::str::FromStr;
use tracing::Level;
use traff_29::{api, config, state};

fn init_tracing(level: &str) {
    let level = Level::from_str(level.trim()).unwrap_or(Level::INFO);
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_default()?;
    init_tracing(&config.logging.level);
    tracing::info!(
        config_path = config::DEFAULT_CONFIG_PATH,
        app = %config.app.name,
        "traff-29 starting"
    );

    let state = state::ApiState::from_config(&config)?;
    tracing::info!(
        geocode_url = config.geocode_url(),
        routing_url = config.routing_url(),
        timeout_ms = config.provider_timeout().as_millis() as u64,
        map_key_configured = config.map_api_key().is_some(),
        "Providers configured"
    );

    let app = api::router(state);
    let port = config.server_port();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
