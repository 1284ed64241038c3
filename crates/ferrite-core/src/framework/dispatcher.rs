//! Event dispatcher for the Ferrite core.
//!
//! The [`Dispatcher`] is a registry keyed by [`EventKind`] holding at most one
//! handler per kind. Registering a second handler for a kind **replaces** the
//! first without complaint; this is how noisy kinds get explicit no-op
//! handlers and how applications override the defaults.
//!
//! Dispatch never fails. Events without a registered handler (including tags
//! that are not a known kind) are dropped, and handler errors or panics are
//! logged and contained to the event that caused them.
//!
//! ```rust,ignore
//! use ferrite_core::{Dispatcher, EventKind, Ignore};
//!
//! let dispatcher = Dispatcher::new();
//! dispatcher.register(EventKind::TypingStart, Ignore);
//! dispatcher.dispatch(event).await;
//! ```

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::RwLock;
use tracing::{Instrument, Level, debug, span, trace, warn};

use crate::foundation::event::{EventKind, InboundEvent};
use crate::framework::handler::{BoxedHandler, Handler};

/// What happened to a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No handler registered for the event's kind.
    Unhandled,
    /// The handler ran to completion.
    Handled,
    /// The handler returned an error or panicked.
    Failed,
}

impl DispatchOutcome {
    /// Whether a handler was invoked, successfully or not.
    pub fn was_invoked(self) -> bool {
        !matches!(self, DispatchOutcome::Unhandled)
    }
}

/// Registry of event handlers keyed by event kind.
///
/// `Dispatcher` is `Send + Sync`; handlers can be (re-)registered while
/// events are being dispatched.
#[derive(Default)]
pub struct Dispatcher {
    handlers: RwLock<HashMap<EventKind, BoxedHandler>>,
}

impl Dispatcher {
    /// Creates a new, empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `kind`, replacing any existing handler.
    pub fn register<H>(&self, kind: EventKind, handler: H)
    where
        H: Handler + 'static,
    {
        self.register_boxed(kind, Arc::new(handler));
    }

    /// Registers an already boxed handler, replacing any existing handler.
    pub fn register_boxed(&self, kind: EventKind, handler: BoxedHandler) {
        if self.handlers.write().insert(kind, handler).is_some() {
            debug!(event = %kind, "Replaced existing handler");
        } else {
            trace!(event = %kind, "Registered handler");
        }
    }

    /// Removes the handler for `kind`. Returns whether one was registered.
    pub fn unregister(&self, kind: EventKind) -> bool {
        self.handlers.write().remove(&kind).is_some()
    }

    /// Whether a handler is registered for `kind`.
    pub fn is_registered(&self, kind: EventKind) -> bool {
        self.handlers.read().contains_key(&kind)
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Dispatches an event to the handler registered for its kind.
    pub async fn dispatch(&self, event: InboundEvent) -> DispatchOutcome {
        let Some(kind) = event.kind else {
            trace!(event = %event.name, "No handler for unknown event");
            return DispatchOutcome::Unhandled;
        };

        // Clone out of the lock; the guard must not live across the await.
        let handler = self.handlers.read().get(&kind).cloned();
        let Some(handler) = handler else {
            trace!(event = %kind, "No handler registered");
            return DispatchOutcome::Unhandled;
        };

        let span = span!(Level::DEBUG, "dispatch", event = %kind);
        // The handler may panic before handing back its future, so the call
        // itself runs inside the guard.
        let result = AssertUnwindSafe(async move { handler.handle(event).await })
            .catch_unwind()
            .instrument(span)
            .await;

        match result {
            Ok(Ok(())) => DispatchOutcome::Handled,
            Ok(Err(error)) => {
                warn!(event = %kind, error = %error, "Handler failed, event discarded");
                DispatchOutcome::Failed
            }
            Err(_) => {
                warn!(event = %kind, "Handler panicked, event discarded");
                DispatchOutcome::Failed
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handler_count", &self.handler_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HandlerError, HandlerResult};
    use crate::framework::handler::{Ignore, handler_fn};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(counter: &Arc<AtomicUsize>, step: usize) -> impl Handler + 'static {
        let counter = Arc::clone(counter);
        handler_fn(move |_event| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(step, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn test_dispatch_no_handlers() {
        let dispatcher = Dispatcher::new();
        let event = InboundEvent::of(EventKind::Ready, json!({}));
        assert_eq!(dispatcher.dispatch(event).await, DispatchOutcome::Unhandled);
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tag() {
        let counter = Arc::new(AtomicUsize::new(0));
        let dispatcher = Dispatcher::new();
        for kind in EventKind::ALL {
            dispatcher.register(kind, counting(&counter, 1));
        }

        let event = InboundEvent::new("SOMETHING_NEW", json!({"x": 1}));
        assert_eq!(dispatcher.dispatch(event).await, DispatchOutcome::Unhandled);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dispatch_routes_by_kind() {
        let ready = Arc::new(AtomicUsize::new(0));
        let message = Arc::new(AtomicUsize::new(0));

        let dispatcher = Dispatcher::new();
        dispatcher.register(EventKind::Ready, counting(&ready, 1));
        dispatcher.register(EventKind::MessageCreate, counting(&message, 1));

        let outcome = dispatcher
            .dispatch(InboundEvent::of(EventKind::MessageCreate, json!({})))
            .await;

        assert_eq!(outcome, DispatchOutcome::Handled);
        assert_eq!(ready.load(Ordering::SeqCst), 0);
        assert_eq!(message.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_registration_replaces_first() {
        let counter = Arc::new(AtomicUsize::new(0));

        let dispatcher = Dispatcher::new();
        dispatcher.register(EventKind::Ready, counting(&counter, 1));
        dispatcher.register(EventKind::Ready, counting(&counter, 10));
        assert_eq!(dispatcher.handler_count(), 1);

        for _ in 0..3 {
            dispatcher
                .dispatch(InboundEvent::of(EventKind::Ready, json!({})))
                .await;
        }

        // Only the second handler ever ran.
        assert_eq!(counter.load(Ordering::SeqCst), 30);
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_poison_dispatcher() {
        let counter = Arc::new(AtomicUsize::new(0));

        let dispatcher = Dispatcher::new();
        dispatcher.register(
            EventKind::MessageCreate,
            handler_fn(|_event| async { Err(HandlerError::other("bad payload")) }),
        );
        dispatcher.register(EventKind::Ready, counting(&counter, 1));

        let failed = dispatcher
            .dispatch(InboundEvent::of(EventKind::MessageCreate, json!({})))
            .await;
        let handled = dispatcher
            .dispatch(InboundEvent::of(EventKind::Ready, json!({})))
            .await;

        assert_eq!(failed, DispatchOutcome::Failed);
        assert_eq!(handled, DispatchOutcome::Handled);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_handler_is_contained() {
        let dispatcher = Dispatcher::new();
        dispatcher.register(
            EventKind::TypingStart,
            handler_fn(|event| async move {
                if event.data.is_null() {
                    panic!("unexpected null payload");
                }
                Ok(())
            }),
        );

        let outcome = dispatcher
            .dispatch(InboundEvent::of(EventKind::TypingStart, serde_json::Value::Null))
            .await;
        assert_eq!(outcome, DispatchOutcome::Failed);
        assert!(outcome.was_invoked());
    }

    struct PanicsBeforeFuture;

    impl Handler for PanicsBeforeFuture {
        fn handle(&self, event: InboundEvent) -> futures::future::BoxFuture<'_, HandlerResult> {
            let id = event.data["id"].as_str().expect("id");
            let id = id.to_string();
            Box::pin(async move {
                debug!(%id, "handled");
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn test_handler_panicking_before_its_future_is_contained() {
        let counter = Arc::new(AtomicUsize::new(0));
        let dispatcher = Dispatcher::new();
        dispatcher.register(EventKind::MessageUpdate, PanicsBeforeFuture);
        dispatcher.register(EventKind::Ready, counting(&counter, 1));

        let outcome = dispatcher
            .dispatch(InboundEvent::of(EventKind::MessageUpdate, json!({})))
            .await;
        assert_eq!(outcome, DispatchOutcome::Failed);

        let outcome = dispatcher
            .dispatch(InboundEvent::of(EventKind::MessageUpdate, json!({"id": "7"})))
            .await;
        assert_eq!(outcome, DispatchOutcome::Handled);

        dispatcher
            .dispatch(InboundEvent::of(EventKind::Ready, json!({})))
            .await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ignore_and_unregister() {
        let dispatcher = Dispatcher::new();
        dispatcher.register(EventKind::PresenceUpdate, Ignore);
        assert!(dispatcher.is_registered(EventKind::PresenceUpdate));

        let event = InboundEvent::of(EventKind::PresenceUpdate, json!({}));
        assert_eq!(dispatcher.dispatch(event.clone()).await, DispatchOutcome::Handled);

        assert!(dispatcher.unregister(EventKind::PresenceUpdate));
        assert!(!dispatcher.unregister(EventKind::PresenceUpdate));
        assert_eq!(dispatcher.dispatch(event).await, DispatchOutcome::Unhandled);
    }
}
