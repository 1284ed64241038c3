//! [`Gateway`] implementation backed by the Discord REST API and gateway
//! socket.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use ferrite_core::{
    ApiError, ApiResult, ConnectionHandle, Gateway, Method, RestConfig, TransportError,
    TransportResult,
};
use ferrite_transport::{HttpClient, HttpResponse};

use crate::model::{GatewayPayload, opcode, presence_for_version};

/// REST half of the Discord API.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: HttpClient,
    config: RestConfig,
}

impl RestClient {
    pub fn new(config: RestConfig) -> TransportResult<Self> {
        let http = HttpClient::new(config.timeout)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Issues an authorized request against an API path.
    ///
    /// A `Null` body sends no body at all.
    pub async fn request(&self, method: Method, path: &str, body: Value) -> ApiResult<Value> {
        let url = self.config.endpoint(path);
        let auth = format!("Bot {}", self.config.token);
        let body = (!body.is_null()).then_some(body);

        let resp = self.http.request(method, &url, Some(&auth), body).await?;
        into_result(resp)
    }
}

fn into_result(resp: HttpResponse) -> ApiResult<Value> {
    if resp.is_success() {
        return Ok(resp.body);
    }
    let message = match &resp.body {
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| resp.body.to_string()),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    Err(ApiError::Http {
        status: resp.status,
        message,
    })
}

/// Outbound side of a Discord connection.
#[derive(Debug, Clone)]
pub struct DiscordGateway {
    rest: RestClient,
    socket: ConnectionHandle,
}

impl DiscordGateway {
    pub fn new(rest: RestClient, socket: ConnectionHandle) -> Self {
        Self { rest, socket }
    }
}

#[async_trait]
impl Gateway for DiscordGateway {
    async fn call(&self, method: Method, path: &str, body: Value) -> ApiResult<Value> {
        debug!(method = %method, path = %path, "Discord API call");
        self.rest.request(method, path, body).await.inspect_err(|e| {
            warn!(method = %method, path = %path, error = %e, "Discord API call failed");
        })
    }

    async fn send(&self, op: u8, payload: Value) -> TransportResult<()> {
        if self.socket.is_closed() {
            return Err(TransportError::ConnectionClosed {
                reason: "gateway socket is closed".to_string(),
            });
        }
        let payload = if op == opcode::PRESENCE_UPDATE {
            presence_for_version(payload, self.rest.config().api_version)
        } else {
            payload
        };
        let frame = serde_json::to_value(GatewayPayload::new(op, payload))
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        self.socket.send_json(&frame).await
    }

    fn close(&self) {
        self.socket.close();
    }
}
