//! Outbound actions produced by the relay logic.

use serde::Serialize;
use serde_json::{Value, json};

/// Activity type for "Playing {name}".
pub const ACTIVITY_PLAYING: u8 = 0;

/// Activity shown next to the bot's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
}

/// Presence fields sent on the push channel.
///
/// Serializes to the gateway's `{game, status, afk, since}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presence {
    pub status: String,
    #[serde(rename = "game")]
    pub activity: Activity,
    pub afk: bool,
    /// Unix millis when the client went idle; `None` serializes as `null`.
    pub since: Option<u64>,
}

impl Presence {
    /// Online, playing `"with {username}"`.
    pub fn playing_with(username: &str) -> Self {
        Self {
            status: "online".to_string(),
            activity: Activity {
                name: format!("with {username}"),
                kind: ACTIVITY_PLAYING,
            },
            afk: false,
            since: None,
        }
    }
}

/// A side effect requested by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundAction {
    /// Post `content` to a channel via the request/response channel.
    PostMessage { channel_id: String, content: String },
    /// Update the bot's presence via the push channel.
    PresenceUpdate(Presence),
}

impl OutboundAction {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            OutboundAction::PostMessage { .. } => "post_message",
            OutboundAction::PresenceUpdate(_) => "presence_update",
        }
    }

    /// JSON body for `PostMessage`.
    pub(crate) fn message_body(content: &str) -> Value {
        json!({ "content": content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_wire_shape() {
        let value = serde_json::to_value(Presence::playing_with("alice")).unwrap();
        assert_eq!(
            value,
            json!({
                "game": {"name": "with alice", "type": 0},
                "status": "online",
                "afk": false,
                "since": null
            })
        );
    }
}
