//! Error types for the platformer crates.

use thiserror::Error;

/// Top-level error type for platformer operations.
///
/// The simulation core itself never fails; these cover the outer layers that
/// load levels and configuration.
#[derive(Debug, Error)]
pub enum PlatformerError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Level construction errors
    #[error("Level error: {0}")]
    Level(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for platformer operations.
pub type PlatformerResult<T> = Result<T, PlatformerError>;
