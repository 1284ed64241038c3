//! Session state store.
//!
//! Holds the bot's own [`Identity`] once the session-ready event has been
//! seen. The identity is published exactly once through a [`OnceLock`], so a
//! concurrent reader sees either nothing or the complete value, never a
//! partially written one.

use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::foundation::model::Identity;

/// Write-once store for the bot's identity.
#[derive(Debug, Default)]
pub struct SessionState {
    identity: OnceLock<Identity>,
}

impl SessionState {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes the identity.
    ///
    /// Returns `false` and leaves the stored identity untouched if one was
    /// already set; the first session-ready event wins for the lifetime of
    /// the process.
    pub fn set_identity(&self, identity: Identity) -> bool {
        match self.identity.set(identity) {
            Ok(()) => {
                debug!("Session identity published");
                true
            }
            Err(rejected) => {
                warn!(
                    current = ?self.identity.get().map(|i| &i.id),
                    rejected = %rejected.id,
                    "Identity already set, ignoring"
                );
                false
            }
        }
    }

    /// Returns the identity, or `None` before the session is ready.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.get()
    }

    /// Whether the session-ready event has been processed.
    pub fn is_ready(&self) -> bool {
        self.identity.get().is_some()
    }
}
