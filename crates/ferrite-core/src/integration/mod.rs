//! Integration layer - the core's boundary with the outside world.
//!
//! - Narrow gateway/connector interfaces
//! - Session state shared across handlers
//! - Execution of outbound actions

pub mod executor;
pub mod gateway;
pub mod session;

pub use executor::{ActionExecutor, ExecutionSummary};
pub use gateway::{BoxedGateway, Connection, Connector, Gateway, Method, OP_PRESENCE_UPDATE};
pub use session::SessionState;
