//! Diagnostic creation, severity management, and terminal rendering.
//!
//! Harness warnings such as an unknown port name are structured
//! [`Diagnostic`] values. The thread-safe [`DiagnosticSink`] accumulates them
//! and can echo each one to stderr as it arrives; [`TerminalRenderer`]
//! formats them for humans.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, RenderStyle, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
