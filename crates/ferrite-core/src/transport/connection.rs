//! Connection handles shared between transports and adapters.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, watch};

use crate::error::{TransportError, TransportResult};

/// Handle to a live client connection.
///
/// Cloning is cheap; all clones write into the same outbound queue and share
/// the same shutdown signal.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    /// Identifier used in logs.
    pub id: String,
    /// Sender for outgoing frames.
    message_tx: mpsc::Sender<Vec<u8>>,
    /// Shutdown signal sender.
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl ConnectionHandle {
    /// Creates a new connection handle.
    pub fn new(
        id: impl Into<String>,
        message_tx: mpsc::Sender<Vec<u8>>,
        shutdown_tx: watch::Sender<bool>,
    ) -> Self {
        Self {
            id: id.into(),
            message_tx,
            shutdown_tx: Arc::new(shutdown_tx),
        }
    }

    /// Queues a frame for sending.
    pub async fn send(&self, data: Vec<u8>) -> TransportResult<()> {
        self.message_tx
            .send(data)
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    /// Queues a JSON frame for sending.
    pub async fn send_json(&self, value: &Value) -> TransportResult<()> {
        let data = serde_json::to_vec(value)
            .map_err(|e| TransportError::SendFailed(format!("JSON serialization failed: {e}")))?;
        self.send(data).await
    }

    /// Signals the connection loop to close.
    pub fn close(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Whether the connection has been closed, either locally or because the
    /// connection loop exited.
    pub fn is_closed(&self) -> bool {
        *self.shutdown_tx.borrow() || self.message_tx.is_closed()
    }
}
