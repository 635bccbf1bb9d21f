//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{BarryConfig, DiscordConfig, LogOutput, LoggingConfig, ServerConfig};

/// Interactions must be answered within three seconds.
const MAX_RESPONSE_TIMEOUT_MS: u64 = 3000;

/// Validates the entire configuration.
pub fn validate_config(config: &BarryConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_discord_config(&config.discord)?;
    if config.server.enabled {
        validate_server_config(&config.server, &config.discord)?;
    }
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if let Some(module) = logging.filters.keys().find(|m| m.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Invalid log filter target: {module:?}"
        )));
    }

    Ok(())
}

fn validate_discord_config(discord: &DiscordConfig) -> ConfigResult<()> {
    if discord.application_id.is_empty() {
        return Err(ConfigError::missing_field("discord.application_id"));
    }

    if !discord.application_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::validation(format!(
            "Application ID must be a snowflake, got {:?}",
            discord.application_id
        )));
    }

    if discord.token.is_empty() {
        return Err(ConfigError::missing_field("discord.token"));
    }

    validate_url(&discord.api_base_url)?;

    if discord.request_timeout_secs == 0 {
        return Err(ConfigError::validation(
            "Request timeout must be greater than 0",
        ));
    }

    Ok(())
}

fn validate_server_config(server: &ServerConfig, discord: &DiscordConfig) -> ConfigResult<()> {
    validate_port(server.port)?;
    validate_path(&server.path)?;

    let Some(public_key) = discord.public_key.as_deref() else {
        return Err(ConfigError::missing_field("discord.public_key"));
    };
    let public_key = public_key.trim();
    if public_key.len() != 64 || !public_key.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ConfigError::validation(
            "Public key must be 64 hex digits",
        ));
    }

    if server.response_timeout_ms == 0 || server.response_timeout_ms >= MAX_RESPONSE_TIMEOUT_MS {
        return Err(ConfigError::validation(format!(
            "Response timeout must be between 1 and {} ms",
            MAX_RESPONSE_TIMEOUT_MS - 1
        )));
    }

    Ok(())
}

fn validate_url(url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::missing_field("discord.api_base_url"));
    }

    let valid_schemes = ["http://", "https://"];
    if !valid_schemes.iter().any(|s| url.starts_with(s)) {
        return Err(ConfigError::invalid_url(
            url,
            format!("URL must start with one of: {valid_schemes:?}"),
        ));
    }

    Ok(())
}

fn validate_port(port: u16) -> ConfigResult<()> {
    if port == 0 {
        return Err(ConfigError::InvalidPort(port));
    }
    Ok(())
}

fn validate_path(path: &str) -> ConfigResult<()> {
    if !path.starts_with('/') {
        return Err(ConfigError::validation("Path must start with '/'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> BarryConfig {
        let mut config = BarryConfig::default();
        config.discord.token = "token".into();
        config.discord.application_id = "100".into();
        config
    }

    fn with_server(config: &mut BarryConfig) {
        config.server.enabled = true;
        config.discord.public_key = Some("ab".repeat(32));
    }

    #[test]
    fn test_validate_minimal_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_validate_missing_credentials() {
        let mut config = valid();
        config.discord.token.clear();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { field }) if field == "discord.token"
        ));

        assert!(matches!(
            validate_config(&BarryConfig::default()),
            Err(ConfigError::MissingField { field }) if field == "discord.application_id"
        ));

        let mut config = valid();
        config.discord.application_id = "barry".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_api_base_url() {
        let mut config = valid();
        config.discord.api_base_url = "discord.com/api".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_validate_server_only_when_enabled() {
        let mut config = valid();
        config.server.port = 0;
        assert!(validate_config(&config).is_ok());

        with_server(&mut config);
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidPort(0))
        ));
    }

    #[test]
    fn test_validate_server_public_key() {
        let mut config = valid();
        with_server(&mut config);
        assert!(validate_config(&config).is_ok());

        config.discord.public_key = None;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { field }) if field == "discord.public_key"
        ));

        config.discord.public_key = Some("xyz".into());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_response_timeout_window() {
        let mut config = valid();
        with_server(&mut config);

        config.server.response_timeout_ms = 3000;
        assert!(validate_config(&config).is_err());

        config.server.response_timeout_ms = 0;
        assert!(validate_config(&config).is_err());

        config.server.response_timeout_ms = 2999;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = valid();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { field }) if field == "logging.file_path"
        ));

        config.logging.file_path = Some("logs/barry.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
