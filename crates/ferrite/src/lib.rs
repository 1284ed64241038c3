//! # Ferrite
//!
//! A small, typed event dispatch and relay framework for chat bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌────────────┐     ┌──────────────────────┐
//! │   Runtime   │────▶│ Dispatcher │────▶│ ReadyHandler         │──▶ SessionState
//! │ (Connector) │     │            │────▶│ MessageRelayHandler  │──▶ ActionExecutor ──▶ Gateway
//! └─────────────┘     └────────────┘────▶│ Ignore / your own    │
//!                                        └──────────────────────┘
//! ```
//!
//! - **Runtime**: loads configuration and the token, drives one connection
//! - **Connector**: protocol adapter producing events and a gateway (Discord)
//! - **Dispatcher**: one handler per event kind, last registration wins
//! - **Relay**: echoes messages that mention the bot, minus the mentions
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ferrite::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = FerriteRuntime::builder().build()?;
//!     let connector = DiscordConnector::new(runtime.gateway_config(), runtime.rest_config());
//!     runtime.run_with(&connector).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `discord` (default): Discord gateway adapter
//! - `json-log`: JSON log output
//! - `ws-client`, `http-client`, `full-transport`: raw transport clients

pub use ferrite_core as core;
pub use ferrite_runtime as runtime;
pub use ferrite_transport as transport;

#[cfg(feature = "discord")]
pub use ferrite_adapter_discord as discord;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use ferrite::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use ferrite_runtime::{FerriteConfig, FerriteRuntime, RuntimeError, TokenError};

    // Event handling
    pub use ferrite_core::{
        DispatchOutcome, Dispatcher, EventKind, Handler, HandlerError, HandlerResult, Ignore,
        InboundEvent, Message, Ready, handler_fn,
    };

    // Outbound side
    pub use ferrite_core::{Connector, Gateway, Method, OutboundAction};

    #[cfg(feature = "discord")]
    pub use ferrite_adapter_discord::DiscordConnector;
}
