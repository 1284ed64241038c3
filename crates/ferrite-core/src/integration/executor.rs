//! Outbound action executor.
//!
//! Turns [`OutboundAction`]s into calls on the two outbound channels of a
//! [`Gateway`]. Actions in one batch run concurrently and independently: a
//! failing call is logged and does not prevent or cancel the others, and no
//! failure is returned to the caller as an error.
//!
//! Background batches that post to the same channel run one after another in
//! the order they were spawned, so replies keep the order of the messages
//! that caused them.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{Instrument, Level, debug, span, warn};

use crate::foundation::action::OutboundAction;
use crate::integration::gateway::{BoxedGateway, Method, OP_PRESENCE_UPDATE};

/// Outcome counts for one executed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub delivered: usize,
    pub failed: usize,
}

/// Issues outbound actions through a gateway.
#[derive(Clone)]
pub struct ActionExecutor {
    gateway: BoxedGateway,
    /// Completion signal of the last batch spawned per channel.
    channel_tails: Arc<Mutex<HashMap<String, oneshot::Receiver<()>>>>,
}

impl ActionExecutor {
    pub fn new(gateway: BoxedGateway) -> Self {
        Self {
            gateway,
            channel_tails: Arc::default(),
        }
    }

    /// Executes every action and waits for all of them to finish.
    pub async fn execute(&self, actions: Vec<OutboundAction>) -> ExecutionSummary {
        let results = join_all(actions.into_iter().map(|action| self.execute_one(action))).await;

        let delivered = results.iter().filter(|ok| **ok).count();
        ExecutionSummary {
            delivered,
            failed: results.len() - delivered,
        }
    }

    /// Executes the batch on a background task and returns immediately.
    ///
    /// Dispatch does not wait on the network; the handle is only useful to
    /// callers that want to observe completion (tests, shutdown drains).
    /// A batch posting to a channel waits for the previous batch spawned for
    /// that channel.
    pub fn spawn(&self, actions: Vec<OutboundAction>) -> JoinHandle<ExecutionSummary> {
        let executor = self.clone();
        let (done, tail) = oneshot::channel::<()>();
        let previous = target_channel(&actions)
            .and_then(|channel| self.channel_tails.lock().insert(channel.to_string(), tail));

        tokio::spawn(async move {
            if let Some(previous) = previous {
                // Resolves once the earlier batch drops its sender.
                let _ = previous.await;
            }
            let summary = executor.execute(actions).await;
            drop(done);
            summary
        })
    }

    async fn execute_one(&self, action: OutboundAction) -> bool {
        let label = action.label();
        let span = span!(Level::DEBUG, "action", kind = label);

        async move {
            let result = match action {
                OutboundAction::PostMessage {
                    channel_id,
                    content,
                } => {
                    let path = format!("/channels/{channel_id}/messages");
                    self.gateway
                        .call(Method::Post, &path, OutboundAction::message_body(&content))
                        .await
                        .map(drop)
                        .map_err(|e| e.to_string())
                }
                OutboundAction::PresenceUpdate(presence) => match serde_json::to_value(&presence) {
                    Ok(payload) => self
                        .gateway
                        .send(OP_PRESENCE_UPDATE, payload)
                        .await
                        .map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                },
            };

            match result {
                Ok(()) => {
                    debug!("Action delivered");
                    true
                }
                Err(error) => {
                    warn!(error = %error, "Action not delivered");
                    false
                }
            }
        }
        .instrument(span)
        .await
    }
}

fn target_channel(actions: &[OutboundAction]) -> Option<&str> {
    actions.iter().find_map(|action| match action {
        OutboundAction::PostMessage { channel_id, .. } => Some(channel_id.as_str()),
        OutboundAction::PresenceUpdate(_) => None,
    })
}

impl std::fmt::Debug for ActionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionExecutor").finish_non_exhaustive()
    }
}
