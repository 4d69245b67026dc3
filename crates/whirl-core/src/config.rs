//! # Ring Configuration
//!
//! Options are plain data, loadable from TOML:
//!
//! ```toml
//! initial_capacity = 64
//! reset_to_initial_capacity = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RingError, RingResult};

/// Capacity used when none is given.
pub const DEFAULT_CAPACITY: usize = 10;

/// Runtime behaviour switches held by every buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RingOptions {
    /// Shrink storage back to the initial capacity whenever a flush empties
    /// the buffer.
    #[serde(default)]
    pub reset_to_initial_capacity: bool,
}

/// Full construction config: initial capacity plus [`RingOptions`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingConfig {
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
    #[serde(default)]
    pub reset_to_initial_capacity: bool,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            reset_to_initial_capacity: false,
        }
    }
}

fn default_initial_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl RingConfig {
    /// Parse and validate a config from TOML text. Missing keys take their
    /// defaults.
    pub fn from_toml_str(text: &str) -> RingResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> RingResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Rejects a zero initial capacity.
    pub fn validate(&self) -> RingResult<()> {
        if self.initial_capacity == 0 {
            return Err(RingError::InvalidCapacity {
                requested: 0,
                minimum: 1,
            });
        }
        Ok(())
    }

    pub fn options(&self) -> RingOptions {
        RingOptions {
            reset_to_initial_capacity: self.reset_to_initial_capacity,
        }
    }
}
