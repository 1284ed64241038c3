//! Built-in handlers for the session-ready and message events.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, info};

use crate::error::HandlerResult;
use crate::foundation::event::InboundEvent;
use crate::foundation::model::{Message, Ready};
use crate::framework::handler::Handler;
use crate::framework::relay::relay;
use crate::integration::executor::ActionExecutor;
use crate::integration::session::SessionState;

/// Records the bot's identity from `READY`.
#[derive(Debug, Clone)]
pub struct ReadyHandler {
    session: Arc<SessionState>,
}

impl ReadyHandler {
    pub fn new(session: Arc<SessionState>) -> Self {
        Self { session }
    }
}

impl Handler for ReadyHandler {
    fn handle(&self, event: InboundEvent) -> BoxFuture<'_, HandlerResult> {
        Box::pin(async move {
            let ready: Ready = event.decode()?;
            info!(
                user_id = %ready.user.id,
                username = %ready.user.username,
                session_id = ready.session_id.as_deref().unwrap_or("-"),
                "Session ready"
            );
            self.session.set_identity(ready.user);
            Ok(())
        })
    }
}

/// Relays messages that mention the bot.
///
/// Outbound actions are handed to the executor's background task, so the
/// handler returns as soon as the message has been decoded and evaluated.
/// Replies to one channel are posted in the order the mentions arrived.
#[derive(Debug, Clone)]
pub struct MessageRelayHandler {
    session: Arc<SessionState>,
    executor: ActionExecutor,
}

impl MessageRelayHandler {
    pub fn new(session: Arc<SessionState>, executor: ActionExecutor) -> Self {
        Self { session, executor }
    }
}

impl Handler for MessageRelayHandler {
    fn handle(&self, event: InboundEvent) -> BoxFuture<'_, HandlerResult> {
        Box::pin(async move {
            let message: Message = event.decode()?;

            let actions = relay(&message, self.session.identity());
            if actions.is_empty() {
                return Ok(());
            }

            debug!(
                message_id = %message.id,
                channel_id = %message.channel_id,
                actions = actions.len(),
                "Bot mentioned, relaying"
            );
            self.executor.spawn(actions);
            Ok(())
        })
    }
}
