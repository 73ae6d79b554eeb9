//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Persistence errors from the filter store.
///
/// Expected conditions (duplicate insert, missing word on remove) are not
/// errors; they are reported through the store's result enums.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Failures from the outbound backend trigger.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("Backend call timed out")]
    TimedOut,

    #[error("Backend transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Failures when sending through the Discord gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Channel not found: {name}")]
    #[allow(dead_code)]
    ChannelNotFound { name: String },

    #[error("Failed to send message to channel {channel_id}: {source}")]
    SendFailed {
        channel_id: u64,
        #[source]
        source: serenity::Error,
    },

    #[error("Failed to respond to interaction: {0}")]
    RespondFailed(#[source] serenity::Error),
}

/// Errors resolved within the command dispatcher.
///
/// None of these propagate past the dispatcher; each is turned into exactly
/// one user-visible reply.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Administrator permission required")]
    PermissionDenied,

    #[error("Invalid input: {message}")]
    ValidationFailed { message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for gateway operations.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
