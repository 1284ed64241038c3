//! # Ferrite Core
//!
//! The event dispatch and message relay core of the Ferrite bot framework.
//!
//! ## Architecture Layers
//!
//! ### Foundation Layer
//!
//! - **Events**: raw envelopes with a typed tag ([`InboundEvent`], [`EventKind`])
//! - **Model**: decoded payloads ([`Identity`], [`Message`])
//! - **Actions**: what handlers ask the outside world to do ([`OutboundAction`])
//!
//! ### Framework Layer
//!
//! - **Handlers**: [`Handler`] trait, [`handler_fn`] and [`Ignore`]
//! - **Dispatcher**: kind-keyed registry with overwrite semantics ([`Dispatcher`])
//! - **Relay**: the mention-stripping decision logic ([`relay`], [`strip_mention`])
//!
//! ### Integration Layer
//!
//! - **Gateway**: narrow `call`/`send` interface ([`Gateway`], [`Connector`])
//! - **Session**: write-once identity store ([`SessionState`])
//! - **Executor**: issues actions without blocking dispatch ([`ActionExecutor`])
//!
//! ## Event Flow
//!
//! ```text
//! ┌───────────┐     ┌────────────┐     ┌───────────────────┐
//! │ Connector │────▶│ Dispatcher │────▶│ ReadyHandler      │──▶ SessionState
//! │ (Discord) │     │   (Core)   │────▶│ MessageRelay      │──▶ ActionExecutor ──▶ Gateway
//! └───────────┘     └────────────┘────▶│ Ignore (noisy)    │
//!                                      └───────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ferrite_core::{
//!     ActionExecutor, Dispatcher, EventKind, MessageRelayHandler, ReadyHandler, SessionState,
//! };
//!
//! let session = Arc::new(SessionState::new());
//! let executor = ActionExecutor::new(gateway);
//!
//! let dispatcher = Dispatcher::new();
//! dispatcher.register(EventKind::Ready, ReadyHandler::new(session.clone()));
//! dispatcher.register(EventKind::MessageCreate, MessageRelayHandler::new(session, executor));
//!
//! while let Some(event) = events.recv().await {
//!     dispatcher.dispatch(event).await;
//! }
//! ```

pub mod error;
pub mod foundation;
pub mod framework;
pub mod integration;
pub mod transport;

pub use error::{
    ApiError, ApiResult, DecodeError, HandlerError, HandlerResult, TransportError,
    TransportResult,
};

pub use foundation::{
    Activity, Author, EventKind, Identity, InboundEvent, Mention, Message, OutboundAction,
    Presence, Ready, UnknownEventKind,
};

pub use framework::{
    BoxedHandler, DispatchOutcome, Dispatcher, Handler, HandlerFn, Ignore, MessageRelayHandler,
    ReadyHandler, handler_fn, relay, strip_mention,
};

pub use integration::{
    ActionExecutor, BoxedGateway, Connection, Connector, ExecutionSummary, Gateway, Method,
    OP_PRESENCE_UPDATE, SessionState,
};

pub use transport::{ConnectionHandle, GatewayConfig, RestConfig, intents};

/// Prelude for common imports.
pub mod prelude {
    pub use super::foundation::*;
    pub use super::framework::{Dispatcher, Handler, Ignore, handler_fn};
    pub use super::integration::{Gateway, SessionState};
}
