//! Establishes gateway sessions.
//!
//! ```text
//! GET /gateway/bot ──▶ connect ws ──▶ HELLO ──▶ IDENTIFY ──▶ DISPATCH...
//!                                        │
//!                                        └──▶ heartbeat task (op 1 every interval)
//! ```
//!
//! Sessions are not resumed. RECONNECT, INVALID_SESSION and a dropped socket
//! all end the event stream.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::{Notify, mpsc};
use tokio::time::{Instant, interval_at, timeout};
use tracing::{debug, info, trace, warn};

use ferrite_core::{
    ApiError, Connection, ConnectionHandle, Connector, GatewayConfig, InboundEvent, Method,
    RestConfig, TransportError, TransportResult,
};
use ferrite_transport::WsClient;

use crate::gateway::{DiscordGateway, RestClient};
use crate::model::{GatewayPayload, Hello, identify, opcode};

/// How long to wait for HELLO after the socket opens.
const HELLO_TIMEOUT: Duration = Duration::from_secs(30);

/// Connects to the Discord gateway.
#[derive(Debug, Clone)]
pub struct DiscordConnector {
    gateway: GatewayConfig,
    rest: RestConfig,
}

impl DiscordConnector {
    pub fn new(gateway: GatewayConfig, rest: RestConfig) -> Self {
        Self { gateway, rest }
    }

    /// Connector with default settings for `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        Self::new(GatewayConfig::new(token.clone()), RestConfig::new(token))
    }

    async fn resolve_url(&self, rest: &RestClient) -> TransportResult<String> {
        let base = match &self.gateway.url {
            Some(url) => url.clone(),
            None => fetch_gateway_url(rest).await?,
        };
        Ok(self.gateway.versioned_url(&base))
    }
}

#[async_trait]
impl Connector for DiscordConnector {
    async fn connect(&self) -> TransportResult<Connection> {
        let rest = RestClient::new(self.rest.clone())?;
        let url = self.resolve_url(&rest).await?;

        let (socket, mut frames) = WsClient::new(self.gateway.event_buffer)
            .connect(&url)
            .await?;

        let hello = match read_hello(&mut frames).await {
            Ok(hello) => hello,
            Err(e) => {
                socket.close();
                return Err(e);
            }
        };
        debug!(interval_ms = hello.heartbeat_interval, "Received HELLO");

        let frame = GatewayPayload::new(
            opcode::IDENTIFY,
            identify(&self.gateway.token, self.gateway.intents),
        );
        socket
            .send_json(&serde_json::to_value(&frame).map_err(|e| {
                TransportError::Handshake(format!("failed to encode IDENTIFY: {e}"))
            })?)
            .await?;
        info!(intents = self.gateway.intents, "Sent IDENTIFY");

        let session = Arc::new(SessionLink::default());
        let (event_tx, events) = mpsc::channel(self.gateway.event_buffer.max(1));

        tokio::spawn(run_heartbeat(
            socket.clone(),
            Arc::clone(&session),
            Duration::from_millis(hello.heartbeat_interval.max(1)),
        ));
        tokio::spawn(run_reader(frames, socket.clone(), session, event_tx));

        Ok(Connection {
            gateway: Arc::new(DiscordGateway::new(rest, socket)),
            events,
        })
    }
}

/// Asks the REST API where the gateway lives.
async fn fetch_gateway_url(rest: &RestClient) -> TransportResult<String> {
    let body = rest
        .request(Method::Get, "/gateway/bot", Value::Null)
        .await
        .map_err(|e| match e {
            ApiError::Transport(e) => e,
            other => TransportError::Handshake(format!("gateway discovery failed: {other}")),
        })?;

    body.get("url")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TransportError::Handshake("gateway discovery returned no url".to_string()))
}

async fn read_hello(frames: &mut mpsc::Receiver<Vec<u8>>) -> TransportResult<Hello> {
    let raw = timeout(HELLO_TIMEOUT, frames.recv())
        .await
        .map_err(|_| TransportError::Handshake("timed out waiting for HELLO".to_string()))?
        .ok_or_else(|| TransportError::ConnectionClosed {
            reason: "closed before HELLO".to_string(),
        })?;

    let payload = GatewayPayload::parse(&raw)
        .map_err(|e| TransportError::Handshake(format!("malformed frame: {e}")))?;
    if payload.op != opcode::HELLO {
        return Err(TransportError::Handshake(format!(
            "expected HELLO (op {}), got op {}",
            opcode::HELLO,
            payload.op
        )));
    }
    serde_json::from_value(payload.d)
        .map_err(|e| TransportError::Handshake(format!("malformed HELLO: {e}")))
}

/// State shared by the reader and heartbeat tasks.
#[derive(Debug, Default)]
struct SessionLink {
    last_sequence: Mutex<Option<u64>>,
    heartbeat_now: Notify,
}

impl SessionLink {
    fn heartbeat_frame(&self) -> Value {
        let seq = *self.last_sequence.lock();
        json!({ "op": opcode::HEARTBEAT, "d": seq })
    }
}

async fn run_heartbeat(socket: ConnectionHandle, session: Arc<SessionLink>, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = session.heartbeat_now.notified() => {}
        }
        if socket.is_closed() {
            break;
        }
        let frame = session.heartbeat_frame();
        trace!(frame = %frame, "Sending heartbeat");
        if let Err(e) = socket.send_json(&frame).await {
            warn!(error = %e, "Heartbeat failed");
            break;
        }
    }
    debug!("Heartbeat task stopped");
}

async fn run_reader(
    mut frames: mpsc::Receiver<Vec<u8>>,
    socket: ConnectionHandle,
    session: Arc<SessionLink>,
    events: mpsc::Sender<InboundEvent>,
) {
    while let Some(raw) = frames.recv().await {
        let payload = match GatewayPayload::parse(&raw) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Discarding malformed gateway frame");
                continue;
            }
        };
        if let Some(seq) = payload.s {
            *session.last_sequence.lock() = Some(seq);
        }

        match payload.op {
            opcode::DISPATCH => {
                let Some(event) = payload.into_inbound() else {
                    warn!("Dispatch frame without event name");
                    continue;
                };
                trace!(event = %event.name, "Dispatch received");
                if events.send(event).await.is_err() {
                    debug!("Event receiver dropped");
                    break;
                }
            }
            opcode::HEARTBEAT => session.heartbeat_now.notify_one(),
            opcode::HEARTBEAT_ACK => trace!("Heartbeat acknowledged"),
            opcode::RECONNECT => {
                warn!("Gateway requested reconnect, closing session");
                break;
            }
            opcode::INVALID_SESSION => {
                warn!(resumable = %payload.d, "Gateway invalidated the session, closing");
                break;
            }
            other => debug!(op = other, "Ignoring gateway opcode"),
        }
    }

    socket.close();
    session.heartbeat_now.notify_one();
    info!("Gateway session ended");
}
