//! Ferrite Runtime - Orchestration layer for the Ferrite bot framework.
//!
//! This crate provides:
//! - Configuration loading and validation (`ferrite.toml`, `FERRITE_*`)
//! - Logging setup
//! - Bot token loading
//! - The event loop that feeds a connection into the dispatcher
//!   ([`FerriteRuntime`])
//!
//! ```ignore
//! use ferrite_runtime::FerriteRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = FerriteRuntime::builder().build()?;
//!     let connector = MyConnector::new(runtime.gateway_config(), runtime.rest_config());
//!
//!     // Run until Ctrl+C or the connection closes
//!     runtime.run_with(&connector).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod token;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, FerriteConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LogGuard, init_from_config as init_logging};
pub use runtime::{FerriteRuntime, RuntimeBuilder, RuntimeStats, StatsSnapshot};
pub use token::{TokenError, load_token};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros and span helpers.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
