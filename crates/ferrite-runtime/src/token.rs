//! Bot token loading.
//!
//! The token lives alone on the first line of a local file. Anything after
//! the first line is ignored.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Reasons the token could not be loaded.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token file not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("token file is empty: {}", path.display())]
    Empty { path: PathBuf },

    #[error("failed to read token file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads the token from the first line of `path`, trimmed.
pub fn load_token(path: impl AsRef<Path>) -> Result<String, TokenError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => TokenError::Missing {
            path: path.to_path_buf(),
        },
        _ => TokenError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let token = content.lines().next().unwrap_or_default().trim();
    if token.is_empty() {
        return Err(TokenError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(token.to_string())
}
