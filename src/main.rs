//! Lectern - Discord bridge for a course-generation backend.
//!
//! Holds one gateway connection for slash commands and an inbound HTTP
//! server the backend uses to push messages back into Discord channels.

mod backend;
mod common;
mod config;
mod discord;
mod http;
mod moderation;
mod store;

use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tracing::{error, info, warn};

use backend::OutboundGate;
use config::{env::get_config_path, load_and_validate};
use discord::{CommandDispatcher, Gateway, GatewayBridge};
use http::AppState;
use moderation::{ModerationPipeline, ProfanityFilter};
use store::FilterStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Lectern v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Backend endpoint: {}", config.backend.endpoint);
    info!("  HTTP bind address: {}", config.http.bind_addr());
    info!("  Notify channel: {}", config.http.notify_channel());

    // ============================================================
    // Build the moderation and trigger components
    // ============================================================

    let store = FilterStore::connect(config.database_path()).await?;

    let profanity = Arc::new(ProfanityFilter::with_default_words());
    info!("Default filter loaded ({} words)", profanity.len());

    let pipeline = ModerationPipeline::new(profanity, store.clone());
    let gate = Arc::new(OutboundGate::new(
        config.backend.endpoint.clone(),
        config.backend.timeout(),
    ));
    let dispatcher = Arc::new(CommandDispatcher::new(pipeline, store, gate));

    // ============================================================
    // Build the Discord client and the bridge that shares its connection
    // ============================================================

    let mut client = discord::build_client(&config.discord, dispatcher).await?;

    let bridge: Arc<dyn Gateway> =
        Arc::new(GatewayBridge::new(client.http.clone(), client.cache.clone()));
    let state = AppState {
        gateway: bridge,
        notify_channel: config.http.notify_channel().to_string(),
    };

    let shard_manager = client.shard_manager.clone();

    // ============================================================
    // Run gateway client and HTTP server side by side
    // ============================================================

    let bind_addr = config.http.bind_addr();
    let mut http_task = tokio::spawn(async move { http::server::serve(&bind_addr, state).await });

    let mut gateway_task = tokio::spawn(async move { client.start().await });

    let shutdown = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received - closing gateway connection...");
            true
        }
        result = &mut gateway_task => {
            match result {
                Ok(Ok(())) => info!("Gateway client exited"),
                Ok(Err(e)) => error!("Gateway client error: {}", e),
                Err(e) => error!("Gateway task panicked: {}", e),
            }
            false
        }
        result = &mut http_task => {
            match result {
                Ok(Ok(())) => info!("HTTP server exited"),
                Ok(Err(e)) => error!("HTTP server error: {}", e),
                Err(e) => error!("HTTP task panicked: {}", e),
            }
            false
        }
    };

    if shutdown {
        shard_manager.shutdown_all().await;
        if let Err(e) = gateway_task.await {
            warn!("Gateway task did not shut down cleanly: {}", e);
        }
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
