//! Plain configuration types handed to transport connectors.
//!
//! The runtime owns the serde schema; these are the resolved values.

use std::time::Duration;

/// Gateway intent bits.
pub mod intents {
    pub const GUILDS: u64 = 1 << 0;
    pub const GUILD_MESSAGES: u64 = 1 << 9;
    pub const DIRECT_MESSAGES: u64 = 1 << 12;
    pub const MESSAGE_CONTENT: u64 = 1 << 15;

    /// What the mention relay needs to see messages and their content.
    pub const DEFAULT: u64 = GUILDS | GUILD_MESSAGES | DIRECT_MESSAGES | MESSAGE_CONTENT;
}

// =============================================================================
// Gateway (push channel) Config
// =============================================================================

/// Configuration for the gateway WebSocket connection.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Explicit gateway URL; `None` discovers it through the REST API.
    pub url: Option<String>,
    /// Bot token used for IDENTIFY.
    pub token: String,
    /// Gateway API version appended as `?v=`.
    pub api_version: u8,
    /// Intent bitfield sent with IDENTIFY.
    pub intents: u64,
    /// Capacity of the inbound event queue.
    pub event_buffer: usize,
}

impl GatewayConfig {
    /// Creates a config with defaults for everything except the token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            url: None,
            token: token.into(),
            api_version: 10,
            intents: intents::DEFAULT,
            event_buffer: 256,
        }
    }

    /// Uses a fixed gateway URL instead of discovering one.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Appends the version and encoding query to a base gateway URL.
    pub fn versioned_url(&self, base: &str) -> String {
        let base = base.trim_end_matches('/');
        format!("{base}/?v={}&encoding=json", self.api_version)
    }
}

// =============================================================================
// REST (request/response channel) Config
// =============================================================================

/// Configuration for the REST API client.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// API root, without version suffix.
    pub base_url: String,
    /// Bot token sent as `Authorization: Bot <token>`.
    pub token: String,
    /// API version appended as `/v{n}`.
    pub api_version: u8,
    /// Request timeout.
    pub timeout: Duration,
}

impl RestConfig {
    /// Creates a config pointing at the public API.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: "https://discord.com/api".to_string(),
            token: token.into(),
            api_version: 10,
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the request timeout duration.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL for an API path such as `/channels/1/messages`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/v{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_version,
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versioned_gateway_url() {
        let config = GatewayConfig::new("t");
        assert_eq!(
            config.versioned_url("wss://gateway.discord.gg/"),
            "wss://gateway.discord.gg/?v=10&encoding=json"
        );
    }

    #[test]
    fn test_rest_endpoint_joins_slashes() {
        let config = RestConfig::new("t").with_base_url("http://localhost:8080/api/");
        assert_eq!(
            config.endpoint("/channels/9/messages"),
            "http://localhost:8080/api/v10/channels/9/messages"
        );
    }

    #[test]
    fn test_default_intents_include_message_content() {
        assert_eq!(intents::DEFAULT & intents::MESSAGE_CONTENT, 1 << 15);
        assert_eq!(intents::DEFAULT, 1 | 512 | 4096 | 32768);
    }
}
