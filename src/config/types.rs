//! Configuration type definitions.

use serde::Deserialize;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub discord: DiscordConfig,
    pub backend: BackendConfig,
    pub http: HttpConfig,
    pub database: Option<DatabaseConfig>,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    pub token: String,
    /// Guild to register slash commands against. When unset, commands are
    /// registered globally (slower to propagate).
    pub guild_id: Option<u64>,
}

/// Course-generation backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Trigger endpoint, e.g. "http://localhost:5000/v1/discord/zeroshot_trigger".
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_seconds: Option<u64>,
}

/// Inbound HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub host: Option<String>,
    pub port: u16,
    /// Channel name resolved by the named-channel send endpoint.
    pub notify_channel: Option<String>,
}

/// Filter word persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: Option<String>,
}

impl Config {
    /// SQLite database path, defaulting next to the binary.
    pub fn database_path(&self) -> &str {
        self.database
            .as_ref()
            .and_then(|db| db.path.as_deref())
            .unwrap_or("lectern.db")
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds.unwrap_or(10))
    }
}

impl HttpConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host.as_deref().unwrap_or("127.0.0.1"), self.port)
    }

    pub fn notify_channel(&self) -> &str {
        self.notify_channel.as_deref().unwrap_or("sheldon")
    }
}
