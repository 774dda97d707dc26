//! Error types for header parsing and registry generation.

use std::{fmt, io};

/// Errors from reading a model header or generating registry source.
///
/// Malformed port lines are not errors; they are skipped with a warning.
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    /// The header file could not be read.
    #[error("failed to read header: {0}")]
    Io(#[from] io::Error),

    /// The requested model type name is not a Rust identifier.
    #[error("'{name}' is not a valid model type name")]
    InvalidModelName {
        /// The rejected name.
        name: String,
    },

    /// The header declares no ports at all.
    #[error("no port declarations found in header")]
    NoPorts,

    /// Writing the generated source failed.
    #[error("failed to format generated source")]
    Format(#[from] fmt::Error),
}
