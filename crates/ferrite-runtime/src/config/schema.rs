//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use ferrite_core::{GatewayConfig, RestConfig, intents};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FerriteConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Bot identity settings.
    #[serde(default)]
    pub bot: BotSettings,

    /// Gateway connection settings.
    #[serde(default)]
    pub gateway: GatewaySettings,

    /// REST API settings.
    #[serde(default)]
    pub rest: RestSettings,
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    #[cfg(feature = "json-log")]
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level.
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Target file when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread ids in log lines.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line in log lines.
    #[serde(default)]
    pub file_location: bool,

    /// Per-module levels, e.g. `ferrite_adapter_discord = "trace"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

// =============================================================================
// Bot
// =============================================================================

/// Bot identity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    /// File whose first line is the bot token.
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            token_file: default_token_file(),
        }
    }
}

fn default_token_file() -> PathBuf {
    PathBuf::from("token.dat")
}

// =============================================================================
// Gateway
// =============================================================================

/// Gateway connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Fixed gateway URL. Discovered through `GET /gateway/bot` when unset.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_api_version")]
    pub api_version: u8,

    /// Intent bitfield sent with IDENTIFY.
    #[serde(default = "default_intents")]
    pub intents: u64,

    /// Capacity of the inbound event queue.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            url: None,
            api_version: default_api_version(),
            intents: default_intents(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl GatewaySettings {
    /// Converts to the connector-level config.
    pub fn to_gateway_config(&self, token: &str) -> GatewayConfig {
        GatewayConfig {
            url: self.url.clone(),
            token: token.to_string(),
            api_version: self.api_version,
            intents: self.intents,
            event_buffer: self.event_buffer,
        }
    }
}

fn default_api_version() -> u8 {
    10
}

fn default_intents() -> u64 {
    intents::DEFAULT
}

fn default_event_buffer() -> usize {
    256
}

// =============================================================================
// REST
// =============================================================================

/// REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestSettings {
    /// API root without the version segment.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RestSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl RestSettings {
    /// Converts to the connector-level config. The API version is shared
    /// with the gateway.
    pub fn to_rest_config(&self, token: &str, api_version: u8) -> RestConfig {
        RestConfig {
            base_url: self.base_url.clone(),
            token: token.to_string(),
            api_version,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

fn default_base_url() -> String {
    "https://discord.com/api".to_string()
}

fn default_timeout_ms() -> u64 {
    30000
}
