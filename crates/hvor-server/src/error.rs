//! Server error types.

use std::io;
use thiserror::Error;

use hvor_core::{CoreError, TracingError};
use hvor_feed::FeedError;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The feed could not be fetched or parsed.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// The feed was fetched but an entry could not be classified.
    #[error("Failed to classify calendar: {0}")]
    Classify(#[from] CoreError),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The listen address could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Logging could not be initialized.
    #[error(transparent)]
    Tracing(#[from] TracingError),
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a bind error.
    pub fn bind(addr: impl Into<String>, source: io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }
}
