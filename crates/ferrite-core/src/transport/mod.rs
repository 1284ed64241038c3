//! Transport-facing types shared by the transport and adapter crates.

pub mod config;
pub mod connection;

pub use config::{GatewayConfig, RestConfig, intents};
pub use connection::ConnectionHandle;
