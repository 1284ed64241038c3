//! Foundation layer - data model and event types.
//!
//! - Inbound events and their typed kinds
//! - Decoded payloads (identity, messages)
//! - Outbound actions

pub mod action;
pub mod event;
pub mod model;

pub use action::{Activity, OutboundAction, Presence};
pub use event::{EventKind, InboundEvent, UnknownEventKind};
pub use model::{Author, Identity, Mention, Message, Ready};
