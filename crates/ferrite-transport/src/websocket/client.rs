//! WebSocket client implementation.

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, info, trace, warn};

use ferrite_core::{ConnectionHandle, TransportError, TransportResult};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Capacity of the outbound frame queue.
const OUTBOUND_BUFFER: usize = 256;

/// WebSocket client.
///
/// Opens a single connection and pumps frames in both directions on a
/// background task. The connection is not re-established when it drops;
/// the inbound receiver simply ends.
#[derive(Debug, Clone, Copy)]
pub struct WsClient {
    inbound_buffer: usize,
}

impl WsClient {
    /// Creates a client whose inbound queue holds `inbound_buffer` frames.
    pub fn new(inbound_buffer: usize) -> Self {
        Self {
            inbound_buffer: inbound_buffer.max(1),
        }
    }

    /// Connects to `url`.
    ///
    /// Returns a handle for sending frames and a receiver yielding every text
    /// or binary frame the server sends.
    pub async fn connect(
        &self,
        url: &str,
    ) -> TransportResult<(ConnectionHandle, mpsc::Receiver<Vec<u8>>)> {
        info!(url = %url, "Connecting to WebSocket server");

        let (ws_stream, _response) =
            connect_async(url)
                .await
                .map_err(|e| TransportError::ConnectionFailed {
                    url: url.to_string(),
                    reason: format!("WebSocket connection failed: {e}"),
                })?;
        let (ws_tx, ws_rx) = ws_stream.split();

        let (message_tx, message_rx) = mpsc::channel::<Vec<u8>>(OUTBOUND_BUFFER);
        let (inbound_tx, inbound_rx) = mpsc::channel::<Vec<u8>>(self.inbound_buffer);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = ConnectionHandle::new(url, message_tx, shutdown_tx);

        tokio::spawn(run_client_loop(
            ws_tx,
            ws_rx,
            message_rx,
            inbound_tx,
            shutdown_rx,
            url.to_string(),
        ));

        info!(url = %url, "WebSocket client connected");
        Ok((handle, inbound_rx))
    }
}

impl Default for WsClient {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Pumps frames until shutdown, server close, or error.
async fn run_client_loop(
    mut ws_tx: WsSink,
    mut ws_rx: WsSource,
    mut message_rx: mpsc::Receiver<Vec<u8>>,
    inbound_tx: mpsc::Sender<Vec<u8>>,
    mut shutdown_rx: watch::Receiver<bool>,
    url: String,
) {
    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    info!(url = %url, "WebSocket client shutting down");
                    let _ = ws_tx.close().await;
                    break;
                }
            }

            Some(data) = message_rx.recv() => {
                let msg = Message::Text(String::from_utf8_lossy(&data).into_owned().into());
                if let Err(e) = ws_tx.send(msg).await {
                    warn!(url = %url, error = %e, "Failed to send frame");
                }
            }

            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        trace!(len = text.len(), "Received text");
                        if inbound_tx.send(text.as_str().as_bytes().to_vec()).await.is_err() {
                            debug!(url = %url, "Inbound receiver dropped, closing");
                            let _ = ws_tx.close().await;
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(data))) => {
                        trace!(len = data.len(), "Received binary");
                        if inbound_tx.send(data.to_vec()).await.is_err() {
                            debug!(url = %url, "Inbound receiver dropped, closing");
                            let _ = ws_tx.close().await;
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        trace!("Received ping, sending pong");
                        let _ = ws_tx.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Pong(_))) | Some(Ok(Message::Frame(_))) => {}
                    Some(Ok(Message::Close(frame))) => {
                        info!(url = %url, frame = ?frame, "Server closed connection");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(url = %url, error = %e, "WebSocket error");
                        break;
                    }
                    None => {
                        info!(url = %url, "WebSocket stream ended");
                        break;
                    }
                }
            }
        }
    }
    // Dropping `message_rx` and `inbound_tx` marks the handle closed and ends
    // the inbound stream.
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    async fn echo_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            ws.send(Message::Text("hello".into())).await.unwrap();
            while let Some(Ok(msg)) = ws.next().await {
                if msg.is_text() {
                    ws.send(msg).await.unwrap();
                }
            }
        });

        format!("ws://{addr}")
    }

    #[tokio::test]
    async fn test_frames_flow_both_ways() {
        let url = echo_server().await;
        let (handle, mut inbound) = WsClient::default().connect(&url).await.unwrap();

        assert_eq!(inbound.recv().await.unwrap(), b"hello".to_vec());

        handle.send(b"ping".to_vec()).await.unwrap();
        assert_eq!(inbound.recv().await.unwrap(), b"ping".to_vec());

        handle.close();
        assert!(inbound.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_connect_failure_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = WsClient::default()
            .connect(&format!("ws://{addr}"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::ConnectionFailed { .. }));
    }
}
