//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;
use crate::token::TokenError;
use ferrite_core::TransportError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The bot token could not be read.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The connector failed to establish a session.
    #[error("Connection failed: {0}")]
    Transport(#[from] TransportError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
