//! Framework layer - event processing.
//!
//! - Handler trait and closure adapters
//! - Kind-keyed dispatcher
//! - Message relay decision logic
//! - Built-in handlers for `READY` and `MESSAGE_CREATE`

pub mod dispatcher;
pub mod handler;
pub mod handlers;
pub mod relay;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use handler::{BoxedHandler, Handler, HandlerFn, Ignore, handler_fn};
pub use handlers::{MessageRelayHandler, ReadyHandler};
pub use relay::{relay, strip_mention};
