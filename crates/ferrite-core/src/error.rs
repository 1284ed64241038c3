//! Unified error types for the Ferrite core.
//!
//! Every failure the core can observe falls into one of four buckets:
//!
//! | Error | Raised by | Policy |
//! |-------|-----------|--------|
//! | [`TransportError`] | socket / HTTP plumbing | logged, never aborts dispatch |
//! | [`ApiError`] | request/response calls | logged, never aborts dispatch |
//! | [`DecodeError`] | payload decoding at the handler boundary | logged, event discarded |
//! | [`HandlerError`] | any registered handler | logged by the dispatcher, next event proceeds |

use thiserror::Error;

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors that can occur in transport operations.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {url} - {reason}")]
    ConnectionFailed {
        /// The URL that failed to connect.
        url: String,
        /// Reason for failure.
        reason: String,
    },

    /// Connection closed.
    #[error("connection closed: {reason}")]
    ConnectionClosed {
        /// Reason for closure.
        reason: String,
    },

    /// Gateway handshake did not complete.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// Message send failed.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// Transport not available.
    #[error("transport '{transport}' not available")]
    NotAvailable {
        /// The transport type that's not available.
        transport: &'static str,
    },

    /// Invalid configuration.
    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// API Errors
// =============================================================================

/// Error type for request/response API calls.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The gateway is not connected.
    #[error("gateway is not connected")]
    NotConnected,
    /// The API call timed out.
    #[error("API call timed out")]
    Timeout,
    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Http { status: u16, message: String },
    /// Failed to serialize/deserialize.
    #[error("serialization error: {0}")]
    SerializationError(String),
    /// Transport error.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

// =============================================================================
// Decode / Handler Errors
// =============================================================================

/// A payload did not match the schema expected for its event kind.
#[derive(Debug, Error)]
#[error("malformed {kind} payload: {source}")]
pub struct DecodeError {
    /// Wire name of the event whose payload failed to decode.
    pub kind: &'static str,
    /// Underlying serde error (names the missing or mistyped field).
    #[source]
    pub source: serde_json::Error,
}

impl DecodeError {
    /// Creates a decode error for the given event kind.
    pub fn new(kind: &'static str, source: serde_json::Error) -> Self {
        Self { kind, source }
    }
}

/// Errors returned by event handlers.
///
/// The dispatcher logs these and moves on; they never escape the dispatch
/// loop.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The event payload could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Any other handler-specific failure.
    #[error("{0}")]
    Other(String),
}

impl HandlerError {
    /// Creates an ad-hoc handler error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for event handlers.
pub type HandlerResult = Result<(), HandlerError>;
