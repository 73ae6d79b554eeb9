//! Outbound gate for the course-generation backend.
//!
//! The backend handles one job at a time, so trigger calls are serialized
//! behind a single process-wide slot. Serializing unrelated guilds' requests
//! is the intended backpressure, not per-guild fairness.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::common::error::TriggerError;

/// JSON body sent to the backend trigger endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TriggerPayload {
    pub course_description: String,
    pub channel_id: u64,
    pub mention: String,
}

/// Serializes and time-bounds calls to the backend trigger endpoint.
pub struct OutboundGate {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    slot: Mutex<()>,
}

impl OutboundGate {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            timeout,
            slot: Mutex::new(()),
        }
    }

    /// Issue the trigger call, holding the global slot for its duration.
    ///
    /// The slot is guard-scoped: it is released on success, timeout, and
    /// transport failure alike. Returns the response body when the backend
    /// sent a non-empty one.
    pub async fn trigger(
        &self,
        payload: &TriggerPayload,
    ) -> Result<Option<String>, TriggerError> {
        let _slot = self.slot.lock().await;
        debug!("Triggering backend at {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .map_err(classify_error)?;

        let body = response.text().await.map_err(classify_error)?;
        debug!("Backend responded with {} bytes", body.len());

        Ok(if body.trim().is_empty() {
            None
        } else {
            Some(body)
        })
    }
}

/// Split reqwest failures into the two cases the command layer reports on.
fn classify_error(error: reqwest::Error) -> TriggerError {
    if error.is_timeout() {
        TriggerError::TimedOut
    } else {
        TriggerError::Transport(error)
    }
}
