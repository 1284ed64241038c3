//! Gateway frame envelope and the handshake payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use ferrite_core::InboundEvent;

/// Gateway opcodes.
pub mod opcode {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const PRESENCE_UPDATE: u8 = 3;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

/// Every gateway frame has this shape.
///
/// `s` and `t` are only present on dispatches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayPayload {
    /// A frame carrying only an opcode and its data.
    pub fn new(op: u8, d: Value) -> Self {
        Self {
            op,
            d,
            s: None,
            t: None,
        }
    }

    pub fn parse(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Converts a dispatch frame into an event for the dispatcher.
    ///
    /// Returns `None` for any other opcode or a dispatch without a name.
    pub fn into_inbound(self) -> Option<InboundEvent> {
        if self.op != opcode::DISPATCH {
            return None;
        }
        let name = self.t?;
        Some(InboundEvent::new(name, self.d))
    }
}

/// Data of the HELLO frame.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Hello {
    /// Milliseconds between heartbeats.
    pub heartbeat_interval: u64,
}

/// Builds the IDENTIFY frame data.
pub fn identify(token: &str, intents: u64) -> Value {
    json!({
        "token": token,
        "intents": intents,
        "properties": {
            "os": std::env::consts::OS,
            "browser": "ferrite",
            "device": "ferrite",
        }
    })
}

/// First gateway version that only accepts an `activities` list in presence
/// updates.
pub const ACTIVITIES_SINCE_VERSION: u8 = 8;

/// Rewrites presence data for the negotiated gateway version.
///
/// Older versions take a single `game`; from v8 on the activity must be
/// listed under `activities`. Data already carrying `activities` is left as
/// is.
pub fn presence_for_version(mut d: Value, api_version: u8) -> Value {
    if api_version < ACTIVITIES_SINCE_VERSION {
        return d;
    }
    if let Some(map) = d.as_object_mut() {
        if let Some(game) = map.remove("game") {
            let activities = if game.is_null() { vec![] } else { vec![game] };
            map.entry("activities")
                .or_insert_with(|| Value::Array(activities));
        }
    }
    d
}
