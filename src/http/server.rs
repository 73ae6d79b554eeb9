//! Inbound HTTP server lifecycle.

use anyhow::Result;
use tracing::info;

use crate::http::routes::{router, AppState};

/// Bind and serve the inbound router until the process shuts down.
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Inbound HTTP server listening on {}", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
