//! Inbound HTTP routes.
//!
//! Translates backend requests into gateway sends. Both send endpoints are
//! best-effort: a missing field yields `{"result": ""}` with no send, and a
//! gateway failure degrades to the same empty result instead of an HTTP
//! error, keeping the response shape the backend already expects.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::discord::Gateway;

/// Shared state for the inbound server.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn Gateway>,
    /// Channel name used by the named-channel send endpoint.
    pub notify_channel: String,
}

/// Build the inbound router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/v1/discord/send", post(send_by_channel_id))
        .route(
            "/v1/discord/sheldon/send",
            get(named_send_query).post(named_send_json),
        )
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct SendRequest {
    channel_id: Option<u64>,
    message: Option<String>,
    mention: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendResult {
    result: &'static str,
}

impl SendResult {
    const SENT: Self = Self { result: "true" };
    const EMPTY: Self = Self { result: "" };
}

async fn send_by_channel_id(
    State(state): State<AppState>,
    Json(request): Json<SendRequest>,
) -> Json<SendResult> {
    let (Some(channel_id), Some(message)) = (
        request.channel_id.filter(|id| *id != 0),
        request.message,
    ) else {
        return Json(SendResult::EMPTY);
    };

    let text = format!("{}{}", request.mention.unwrap_or_default(), message);
    deliver(&state, channel_id, &text).await
}

#[derive(Debug, Deserialize)]
struct NamedSendRequest {
    msg: Option<String>,
}

async fn named_send_query(
    State(state): State<AppState>,
    Query(request): Query<NamedSendRequest>,
) -> Json<SendResult> {
    named_send(state, request).await
}

async fn named_send_json(
    State(state): State<AppState>,
    Json(request): Json<NamedSendRequest>,
) -> Json<SendResult> {
    named_send(state, request).await
}

async fn named_send(state: AppState, request: NamedSendRequest) -> Json<SendResult> {
    let Some(msg) = request.msg else {
        return Json(SendResult::EMPTY);
    };

    let Some(channel_id) = state.gateway.resolve_channel_id(&state.notify_channel).await else {
        warn!(
            "Named-channel send failed: channel '{}' not found",
            state.notify_channel
        );
        return Json(SendResult::EMPTY);
    };

    deliver(&state, channel_id, &msg).await
}

async fn deliver(state: &AppState, channel_id: u64, text: &str) -> Json<SendResult> {
    match state.gateway.send_message(channel_id, text).await {
        Ok(()) => Json(SendResult::SENT),
        Err(e) => {
            warn!("Inbound send to channel {} failed: {}", channel_id, e);
            Json(SendResult::EMPTY)
        }
    }
}
