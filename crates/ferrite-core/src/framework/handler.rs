//! Event handler trait and closure adapters.
//!
//! Handlers receive the whole [`InboundEvent`] and decode the payload
//! themselves via [`InboundEvent::decode`], returning a [`HandlerResult`].
//!
//! ```rust,ignore
//! use ferrite_core::{EventKind, Dispatcher, handler_fn};
//!
//! let dispatcher = Dispatcher::new();
//! dispatcher.register(
//!     EventKind::MessageUpdate,
//!     handler_fn(|event| async move {
//!         tracing::info!(data = %event.data, "Message edited");
//!         Ok(())
//!     }),
//! );
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::HandlerResult;
use crate::foundation::event::InboundEvent;

/// Something that reacts to one inbound event.
pub trait Handler: Send + Sync {
    /// Handles the event. Errors are logged by the dispatcher.
    fn handle(&self, event: InboundEvent) -> BoxFuture<'_, HandlerResult>;
}

/// Type-erased, shareable handler.
pub type BoxedHandler = Arc<dyn Handler>;

/// A [`Handler`] backed by an async closure.
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(InboundEvent) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn handle(&self, event: InboundEvent) -> BoxFuture<'_, HandlerResult> {
        Box::pin((self.f)(event))
    }
}

/// Wraps an async closure into a [`Handler`].
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(InboundEvent) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    HandlerFn { f }
}

/// Handler that accepts and drops every event.
///
/// Registered for noisy kinds so they are visibly "handled" rather than
/// falling through as unregistered.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ignore;

impl Handler for Ignore {
    fn handle(&self, _event: InboundEvent) -> BoxFuture<'_, HandlerResult> {
        Box::pin(async { Ok(()) })
    }
}
