//! How hard a diagnostic hits the run.
//!
//! The harness never stops on its own diagnostics: a warning marks a request
//! that was skipped, an error marks one the caller has to look at. Which of
//! the two applies is fixed by the diagnostic constructor, not by the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a [`Diagnostic`](crate::Diagnostic).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The request was dropped and the simulation carried on.
    Warning,
    /// The request could not be honoured.
    Error,
}

impl Severity {
    /// Lower-case name, as used in coded output and serialized reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    /// Shouted form used as the prefix of plain `WARNING: ...` lines.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
