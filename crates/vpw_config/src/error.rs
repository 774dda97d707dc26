//! What can go wrong between `vpw.toml` on disk and a usable [`HarnessConfig`].
//!
//! [`HarnessConfig`]: crate::HarnessConfig

use std::io;
use std::path::PathBuf;

/// Failure to load a harness configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        /// File that was opened.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// The document is not valid TOML or does not match the expected tables.
    #[error("malformed vpw.toml: {0}")]
    Syntax(String),

    /// A name the harness relies on was given as an empty string.
    #[error("`{0}` must not be empty")]
    EmptyName(&'static str),

    /// A trace offset of zero would put two frames on the same timestamp.
    #[error("clock.setup and clock.hold must be at least 1 (got setup {setup}, hold {hold})")]
    ZeroOffset {
        /// Configured settle offset.
        setup: u64,
        /// Configured falling-edge offset.
        hold: u64,
    },

    /// The settle frame of one tick would land on or before the falling edge
    /// of the previous one.
    #[error("clock.setup ({setup}) + clock.hold ({hold}) must be less than clock.period ({period})")]
    OffsetsExceedPeriod {
        /// Configured tick period.
        period: u64,
        /// Configured settle offset.
        setup: u64,
        /// Configured falling-edge offset.
        hold: u64,
    },
}

impl ConfigError {
    /// Returns `true` when the file was readable but its contents were rejected.
    pub fn is_content_error(&self) -> bool {
        !matches!(self, ConfigError::Read { .. })
    }
}
