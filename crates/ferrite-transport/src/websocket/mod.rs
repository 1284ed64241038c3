//! WebSocket transport.
//!
//! Client side only; the bot always dials out to its gateway.

mod client;
pub use client::WsClient;
