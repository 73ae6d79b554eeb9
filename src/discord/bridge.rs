//! Gateway bridge abstraction.
//!
//! The HTTP surface needs exactly two things from the Discord connection:
//! resolving a channel id from its name and sending a message to a channel
//! id. Everything else (authentication, reconnection, command registration)
//! stays inside the serenity client.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::cache::Cache;
use serenity::http::Http;
use serenity::model::id::ChannelId;

use crate::common::error::{GatewayError, GatewayResult};

/// The gateway capabilities exposed to the rest of the system.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Resolve a channel id by channel name across connected guilds.
    async fn resolve_channel_id(&self, name: &str) -> Option<u64>;

    /// Send a plain text message to a channel.
    async fn send_message(&self, channel_id: u64, text: &str) -> GatewayResult<()>;
}

/// Serenity-backed bridge sharing the bot's gateway connection.
pub struct GatewayBridge {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl GatewayBridge {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }
}

#[async_trait]
impl Gateway for GatewayBridge {
    async fn resolve_channel_id(&self, name: &str) -> Option<u64> {
        // The cache is populated once the gateway is ready; until then no
        // channel resolves, which callers report as a failed send.
        for guild_id in self.cache.guilds() {
            if let Some(guild) = self.cache.guild(guild_id) {
                if let Some(channel) = guild.channels.values().find(|c| c.name == name) {
                    return Some(channel.id.get());
                }
            }
        }
        None
    }

    async fn send_message(&self, channel_id: u64, text: &str) -> GatewayResult<()> {
        ChannelId::new(channel_id)
            .say(&self.http, text)
            .await
            .map(|_| ())
            .map_err(|source| GatewayError::SendFailed { channel_id, source })
    }
}
