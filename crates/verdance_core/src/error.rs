//! # Core Error Types
//!
//! Failures at the boundaries of the tile world.

use thiserror::Error;

/// Errors that can occur when building or editing the world.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The grid was asked for a zero-sized dimension.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// A coordinate lies outside the grid.
    #[error("coordinate ({x}, {y}) outside {width}x{height} grid")]
    OutOfBounds {
        /// Requested x.
        x: i64,
        /// Requested y.
        y: i64,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },

    /// A raw tile value does not name a tile kind.
    #[error("invalid tile kind {0}")]
    InvalidKind(i64),

    /// An index set disagrees with the grid.
    #[error("index set `{set}` drifted from grid at ({x}, {y})")]
    IndexDrift {
        /// Name of the offending set.
        set: &'static str,
        /// X of the first offending cell.
        x: u32,
        /// Y of the first offending cell.
        y: u32,
    },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
