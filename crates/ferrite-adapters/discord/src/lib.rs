//! # Ferrite Adapter for Discord
//!
//! Connects the Ferrite core to the Discord gateway (API v10, JSON
//! encoding).
//!
//! ## Overview
//!
//! - [`DiscordConnector`] discovers the gateway, performs the HELLO/IDENTIFY
//!   handshake and keeps the heartbeat going
//! - [`DiscordGateway`] is the [`Gateway`](ferrite_core::Gateway) handed to
//!   the executor: REST calls go out with `Authorization: Bot <token>`, push
//!   frames go out on the socket as `{"op", "d"}`
//! - [`GatewayPayload`] is the `{op, d, s, t}` frame envelope
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ferrite_adapter_discord::DiscordConnector;
//! use ferrite_core::Connector;
//!
//! let connector = DiscordConnector::with_token(token);
//! let mut connection = connector.connect().await?;
//! while let Some(event) = connection.events.recv().await {
//!     dispatcher.dispatch(event).await;
//! }
//! ```

pub mod connector;
pub mod gateway;
pub mod model;

pub use connector::DiscordConnector;
pub use gateway::{DiscordGateway, RestClient};
pub use model::{GatewayPayload, opcode};
