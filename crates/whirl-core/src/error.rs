//! # Ring Error Types

use thiserror::Error;

/// Errors surfaced by ring construction, resizing and configuration.
#[derive(Error, Debug)]
pub enum RingError {
    /// A capacity too small to hold the live elements plus the free slot.
    #[error("invalid capacity {requested}: need at least {minimum}")]
    InvalidCapacity {
        /// The capacity that was asked for.
        requested: usize,
        /// The smallest capacity that would have been accepted.
        minimum: usize,
    },

    /// The configuration could not be parsed.
    #[error("invalid ring config: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("failed to read ring config: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ring operations.
pub type RingResult<T> = Result<T, RingError>;
