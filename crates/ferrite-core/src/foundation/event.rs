//! Inbound gateway events.
//!
//! The gateway delivers every event as a `{type, data}` envelope. The type tag
//! is kept verbatim in [`InboundEvent::name`] and classified into a typed
//! [`EventKind`] so handler registration cannot be misspelled. Tags the core
//! does not know stay valid: they simply have no kind and are never handled.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DecodeError;

// ============================================================================
// Event Kind
// ============================================================================

/// Typed gateway event tags used as dispatcher keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Session is ready; carries the bot's own user.
    Ready,
    /// A previously interrupted session was resumed.
    Resumed,
    /// A message was posted in a visible channel.
    MessageCreate,
    /// A message was edited.
    MessageUpdate,
    /// A message was deleted.
    MessageDelete,
    /// Guild became available (initial sync or join).
    GuildCreate,
    /// A user's presence changed.
    PresenceUpdate,
    /// A user started typing.
    TypingStart,
}

impl EventKind {
    /// All known kinds, in declaration order.
    pub const ALL: [EventKind; 8] = [
        EventKind::Ready,
        EventKind::Resumed,
        EventKind::MessageCreate,
        EventKind::MessageUpdate,
        EventKind::MessageDelete,
        EventKind::GuildCreate,
        EventKind::PresenceUpdate,
        EventKind::TypingStart,
    ];

    /// The wire tag for this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::Ready => "READY",
            EventKind::Resumed => "RESUMED",
            EventKind::MessageCreate => "MESSAGE_CREATE",
            EventKind::MessageUpdate => "MESSAGE_UPDATE",
            EventKind::MessageDelete => "MESSAGE_DELETE",
            EventKind::GuildCreate => "GUILD_CREATE",
            EventKind::PresenceUpdate => "PRESENCE_UPDATE",
            EventKind::TypingStart => "TYPING_START",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a wire tag is not a known [`EventKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventKind(pub String);

impl fmt::Display for UnknownEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event kind: {}", self.0)
    }
}

impl std::error::Error for UnknownEventKind {}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

// ============================================================================
// Inbound Event
// ============================================================================

/// One event as delivered by the transport connector.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    /// Raw type tag from the envelope.
    pub name: String,
    /// Classified kind, `None` for tags the core does not know.
    pub kind: Option<EventKind>,
    /// Event payload, undecoded.
    pub data: Value,
}

impl InboundEvent {
    /// Builds an event from its wire tag and payload.
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        let name = name.into();
        let kind = name.parse().ok();
        Self { name, kind, data }
    }

    /// Builds an event of a known kind.
    pub fn of(kind: EventKind, data: Value) -> Self {
        Self {
            name: kind.as_str().to_string(),
            kind: Some(kind),
            data,
        }
    }

    /// Decodes the payload into a typed value.
    ///
    /// This is the schema check every handler goes through: a missing or
    /// mistyped field becomes a [`DecodeError`] instead of a panic.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        let kind = self.kind.map_or("unknown", EventKind::as_str);
        T::deserialize(&self.data).map_err(|e| DecodeError::new(kind, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_kind_round_trips_through_wire_tag() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_unknown_tag_has_no_kind() {
        let event = InboundEvent::new("CHANNEL_PINS_UPDATE", json!({}));
        assert_eq!(event.kind, None);
        assert_eq!(event.name, "CHANNEL_PINS_UPDATE");
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        assert!("ready".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_decode_reports_kind_and_field() {
        #[derive(Debug, Deserialize)]
        struct NeedsId {
            #[allow(dead_code)]
            id: String,
        }

        let event = InboundEvent::of(EventKind::MessageCreate, json!({"content": "x"}));
        let err = event.decode::<NeedsId>().unwrap_err();
        assert_eq!(err.kind, "MESSAGE_CREATE");
        assert!(err.to_string().contains("missing field `id`"));
    }
}
