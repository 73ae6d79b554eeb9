//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `LECTERN_DISCORD_TOKEN` - Discord bot token
//! - `LECTERN_DISCORD_GUILD_ID` - Guild to register slash commands against
//! - `LECTERN_BACKEND_ENDPOINT` - Course-generation trigger endpoint
//! - `LECTERN_HTTP_PORT` - Inbound HTTP server port
//! - `LECTERN_DATABASE_PATH` - SQLite database path

use std::env;

use crate::config::types::{Config, DatabaseConfig};

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "LECTERN";

/// Apply environment variable overrides to a config.
///
/// This allows sensitive values like the bot token to be provided via
/// environment variables instead of the config file.
pub fn apply_env_overrides(mut config: Config) -> Config {
    // Discord token
    if let Ok(token) = env::var(format!("{}_DISCORD_TOKEN", ENV_PREFIX)) {
        config.discord.token = token;
    }

    // Discord guild ID
    if let Ok(guild_id) = env::var(format!("{}_DISCORD_GUILD_ID", ENV_PREFIX)) {
        if let Ok(id) = guild_id.parse() {
            config.discord.guild_id = Some(id);
        }
    }

    // Backend endpoint
    if let Ok(endpoint) = env::var(format!("{}_BACKEND_ENDPOINT", ENV_PREFIX)) {
        config.backend.endpoint = endpoint;
    }

    // Inbound HTTP port
    if let Ok(port) = env::var(format!("{}_HTTP_PORT", ENV_PREFIX)) {
        if let Ok(port) = port.parse() {
            config.http.port = port;
        }
    }

    // Database path
    if let Ok(path) = env::var(format!("{}_DATABASE_PATH", ENV_PREFIX)) {
        config.database = Some(DatabaseConfig { path: Some(path) });
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `LECTERN_CONFIG` environment variable, otherwise returns "lectern.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "lectern.conf".to_string())
}
