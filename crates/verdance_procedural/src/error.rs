//! # Generation Error Types

use thiserror::Error;
use verdance_core::CoreError;

/// Errors that can occur while generating a world.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The generator configuration cannot produce a world.
    #[error("invalid generator configuration: {0}")]
    InvalidConfig(String),

    /// The world itself rejected the request (e.g. zero dimensions).
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for generation.
pub type GenerationResult<T> = Result<T, GenerationError>;
