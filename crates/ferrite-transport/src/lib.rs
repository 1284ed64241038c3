//! # Ferrite Transport
//!
//! Network transport implementations for the Ferrite bot framework.
//!
//! Adapters build on these to speak a concrete protocol; nothing here knows
//! about any particular chat service.
//!
//! ## Features
//!
//! - `ws-client`: WebSocket client ([`WsClient`])
//! - `http-client`: JSON HTTP client ([`HttpClient`])
//! - `full`: both
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  Adapter Layer      │  (Discord)
//! ├─────────────────────┤
//! │  ferrite-core       │  (handles, errors)
//! ├─────────────────────┤
//! │  ferrite-transport  │  <- This crate
//! ├─────────────────────┤
//! │  Network (TCP/TLS)  │
//! └─────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ferrite_transport::WsClient;
//!
//! let (handle, mut frames) = WsClient::new(256).connect("wss://gateway.example").await?;
//! handle.send(br#"{"op":1,"d":null}"#.to_vec()).await?;
//! while let Some(frame) = frames.recv().await {
//!     // ...
//! }
//! ```

#[cfg(feature = "http-client")]
pub mod http;

#[cfg(feature = "ws-client")]
pub mod websocket;

#[cfg(feature = "http-client")]
pub use http::{HttpClient, HttpResponse};

#[cfg(feature = "ws-client")]
pub use websocket::WsClient;
