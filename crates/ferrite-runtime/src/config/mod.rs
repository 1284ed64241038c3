//! Configuration module for the Ferrite runtime.
//!
//! TOML files and `FERRITE_*` environment variables, layered with figment,
//! plus validation of the merged result.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, load_config, load_config_from_file};
pub use schema::{
    BotSettings, FerriteConfig, GatewaySettings, LogFormat, LogLevel, LogOutput, LoggingConfig,
    RestSettings, SpanEventConfig,
};
pub use validation::validate_config;
