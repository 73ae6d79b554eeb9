//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // Validate Discord config
    if config.discord.token.is_empty() {
        errors.push("discord.token is required".to_string());
    }
    if config.discord.token == "YOUR_DISCORD_TOKEN_HERE" {
        errors.push("discord.token has not been configured (still using placeholder)".to_string());
    }
    if let Some(guild_id) = config.discord.guild_id {
        if guild_id == 0 {
            errors.push("discord.guild_id must be non-zero".to_string());
        }
    }

    // Validate backend config
    if config.backend.endpoint.is_empty() {
        errors.push("backend.endpoint is required".to_string());
    }
    if !config.backend.endpoint.starts_with("http://")
        && !config.backend.endpoint.starts_with("https://")
    {
        errors.push(format!(
            "backend.endpoint must be an http(s) URL (got '{}')",
            config.backend.endpoint
        ));
    }
    if config.backend.timeout_seconds == Some(0) {
        errors.push("backend.timeout_seconds must be non-zero".to_string());
    }

    // Validate HTTP server config
    if config.http.port == 0 {
        errors.push("http.port must be non-zero".to_string());
    }
    if config.http.notify_channel().is_empty() {
        errors.push("http.notify_channel must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::load_config_str;

    fn valid_config() -> Config {
        load_config_str(
            r#"
            discord { token = "t" }
            backend { endpoint = "http://localhost:5000/trigger" }
            http { port = 8080 }
            "#,
        )
        .unwrap()
    }

    #[test]
    fn accepts_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn rejects_empty_token() {
        let mut config = valid_config();
        config.discord.token = String::new();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("discord.token"));
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let mut config = valid_config();
        config.backend.endpoint = "localhost:5000".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("backend.endpoint"));
    }

    #[test]
    fn rejects_zero_port() {
        let mut config = valid_config();
        config.http.port = 0;
        assert!(validate_config(&config).is_err());
    }
}
