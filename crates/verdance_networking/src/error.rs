//! # Network Error Types
//!
//! Protocol and validation errors are non-fatal: they are logged and the
//! connection stays open. Transport errors end one connection. Everything
//! else surfaces at startup.

use std::time::Duration;

use thiserror::Error;
use verdance_core::CoreError;
use verdance_procedural::GenerationError;

/// Errors raised by the sync hub and the server edge.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// An inbound frame could not be decoded into a command.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A decoded command failed a world check (bounds, tile kind).
    #[error("rejected: {0}")]
    Validation(CoreError),

    /// The WebSocket layer failed.
    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// A send did not complete in time.
    #[error("send timed out after {0:?}")]
    SendTimeout(Duration),

    /// Socket I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server config is malformed or out of range.
    #[error("config error: {0}")]
    Config(String),

    /// World generation failed.
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// A background task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Join(String),
}

impl From<CoreError> for NetworkError {
    fn from(err: CoreError) -> Self {
        Self::Validation(err)
    }
}

/// Result type for networking operations.
pub type NetworkResult<T> = Result<T, NetworkError>;
