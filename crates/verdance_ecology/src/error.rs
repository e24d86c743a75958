//! # Ecology Error Types

use thiserror::Error;

/// Errors that can occur when configuring the simulator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcologyError {
    /// A parameter is outside its allowed range.
    #[error("invalid ecology parameter `{name}`: {reason}")]
    InvalidParams {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The params file could not be parsed.
    #[error("invalid ecology configuration: {0}")]
    Config(String),
}

/// Result type for ecology operations.
pub type EcologyResult<T> = Result<T, EcologyError>;
