//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{FerriteConfig, GatewaySettings, RestSettings};

/// Validates the entire configuration.
pub fn validate_config(config: &FerriteConfig) -> ConfigResult<()> {
    if config.bot.token_file.as_os_str().is_empty() {
        return Err(ConfigError::missing_field("bot.token_file"));
    }
    validate_gateway_config(&config.gateway)?;
    validate_rest_config(&config.rest)?;
    Ok(())
}

fn validate_gateway_config(gateway: &GatewaySettings) -> ConfigResult<()> {
    if let Some(url) = &gateway.url {
        validate_url(url, &["ws://", "wss://"])?;
    }
    if gateway.api_version == 0 {
        return Err(ConfigError::validation("Gateway API version must be greater than 0"));
    }
    if gateway.event_buffer == 0 {
        return Err(ConfigError::validation("Event buffer must be greater than 0"));
    }
    Ok(())
}

fn validate_rest_config(rest: &RestSettings) -> ConfigResult<()> {
    validate_url(&rest.base_url, &["http://", "https://"])?;
    if rest.timeout_ms == 0 {
        return Err(ConfigError::validation("Timeout must be greater than 0"));
    }
    Ok(())
}

fn validate_url(url: &str, schemes: &[&str]) -> ConfigResult<()> {
    let Some(rest) = schemes.iter().find_map(|s| url.strip_prefix(s)) else {
        return Err(ConfigError::invalid_url(
            url,
            format!("expected one of {}", schemes.join(", ")),
        ));
    };
    if rest.is_empty() || rest.starts_with('/') {
        return Err(ConfigError::invalid_url(url, "missing host"));
    }
    Ok(())
}
