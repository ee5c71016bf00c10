use api::config::ApiConfig;
use std::env;
use tracing::{error, info, Level};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let level = env::var("HANNA_LOG_LEVEL")
        .ok()
        .and_then(|level| level.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let config = ApiConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    let app = api::app(api::app_state(&config));
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(
        "Hanna dev API listening on {} ({} user(s), refresh rotation: {})",
        listener.local_addr()?,
        config.users.len(),
        config.rotate_refresh_tokens
    );

    axum::serve(listener, app).await?;
    Ok(())
}
