//! Typed payloads for the events the core reacts to.
//!
//! These mirror the gateway's JSON shapes. Unknown fields are ignored; the
//! fields declared here are required unless marked `#[serde(default)]`.

use serde::{Deserialize, Serialize};

/// The bot's own account, learned from the session-ready event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub username: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }

    /// The textual marker that references this user inside message content.
    pub fn mention_token(&self) -> String {
        format!("<@{}>", self.id)
    }

    /// Nickname form of the mention marker, `<@!id>`.
    pub fn nickname_mention_token(&self) -> String {
        format!("<@!{}>", self.id)
    }
}

/// Payload of the `READY` event.
#[derive(Debug, Clone, Deserialize)]
pub struct Ready {
    /// The bot's own user object.
    pub user: Identity,
    /// Session identifier, kept for logging.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Author of a message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Author {
    pub id: String,
    pub username: String,
}

/// A user mentioned in a message. Only the id matters for matching.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Mention {
    pub id: String,
}

/// Payload of the `MESSAGE_CREATE` event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    pub content: String,
    pub author: Author,
    /// Users mentioned, in the order they appear. Required: a message without
    /// this field is treated as malformed.
    pub mentions: Vec<Mention>,
}

impl Message {
    /// Whether `user_id` is among the mentioned users.
    pub fn mentions_user(&self, user_id: &str) -> bool {
        self.mentions.iter().any(|m| m.id == user_id)
    }
}
