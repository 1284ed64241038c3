//! HTTP client implementation.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use tracing::{debug, trace};

use ferrite_core::{Method, TransportError, TransportResult};

/// A decoded HTTP response.
///
/// Non-success statuses are returned as-is; interpreting them is up to the
/// caller.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// JSON body, `Value::Null` when empty, or the raw text as a
    /// `Value::String` when the body is not JSON.
    pub body: Value,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// JSON-over-HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> TransportResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Sends one request.
    ///
    /// `authorization` is passed verbatim as the `Authorization` header.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> TransportResult<HttpResponse> {
        debug!(method = %method, url = %url, "Sending HTTP request");

        let mut req = self.client.request(to_reqwest(method), url);
        if let Some(auth) = authorization {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }
        if let Some(body) = &body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Io(format!("request to {url} timed out"))
            } else {
                TransportError::Io(e.to_string())
            }
        })?;

        let status = resp.status().as_u16();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| TransportError::Io(e.to_string()))?;
        trace!(status, len = bytes.len(), "Received HTTP response");

        Ok(HttpResponse {
            status,
            body: parse_body(&bytes),
        })
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Patch => reqwest::Method::PATCH,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
