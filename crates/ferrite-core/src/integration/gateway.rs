//! The narrow interface between the core and a transport connector.
//!
//! The core only ever needs three things from the outside world:
//!
//! - [`Gateway::call`]: request/response channel (REST-style API)
//! - [`Gateway::send`]: persistent push channel (gateway opcodes)
//! - [`Connector::connect`]: a stream of inbound events
//!
//! ```text
//! ┌───────────────┐  events   ┌────────────┐  actions  ┌──────────┐
//! │   Connector   │──────────▶│ Dispatcher │──────────▶│ Executor │
//! └───────────────┘           └────────────┘           └────┬─────┘
//!         ▲                                                  │
//!         └────────────── Gateway::call / send ──────────────┘
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{ApiResult, TransportResult};
use crate::foundation::event::InboundEvent;

/// Push-channel opcode reserved for presence/status updates.
pub const OP_PRESENCE_UPDATE: u8 = 3;

/// HTTP-style method for [`Gateway::call`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outbound side of a connection.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Issues a request on the request/response channel.
    ///
    /// `path` is relative to the API root, e.g. `/channels/1/messages`.
    async fn call(&self, method: Method, path: &str, body: Value) -> ApiResult<Value>;

    /// Sends `payload` under `opcode` on the push channel.
    async fn send(&self, opcode: u8, payload: Value) -> TransportResult<()>;

    /// Closes the push channel. Does nothing by default.
    fn close(&self) {}
}

/// Shared gateway handle.
pub type BoxedGateway = Arc<dyn Gateway>;

/// An established connection: the outbound gateway plus the inbound stream.
///
/// The stream ends when the underlying connection closes.
pub struct Connection {
    pub gateway: BoxedGateway,
    pub events: mpsc::Receiver<InboundEvent>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

/// Establishes connections. Implemented by protocol adapters.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connects and completes any protocol handshake.
    async fn connect(&self) -> TransportResult<Connection>;
}
