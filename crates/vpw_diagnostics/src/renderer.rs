//! Diagnostic rendering for terminal output.

use crate::diagnostic::Diagnostic;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string without a
    /// trailing newline.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// How a [`TerminalRenderer`] lays out a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RenderStyle {
    /// `WARNING: requested port 'foo' not found.`
    #[default]
    Plain,
    /// `warning[W001]: requested port 'foo' not found.` followed by notes.
    Coded,
}

/// Renders diagnostics for a terminal.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalRenderer {
    /// The layout to use.
    pub style: RenderStyle,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        match self.style {
            RenderStyle::Plain => format!("{}: {}", diag.severity.label(), diag.message),
            RenderStyle::Coded => {
                let mut out = format!("{}[{}]: {}", diag.severity, diag.code, diag.message);
                for note in &diag.notes {
                    out.push_str(&format!("\n   = note: {note}"));
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_unknown_port() {
        let diag = Diagnostic::unknown_port("up_axis_tdata");
        let out = TerminalRenderer::default().render(&diag);
        assert_eq!(out, "WARNING: requested port 'up_axis_tdata' not found.");
    }

    #[test]
    fn plain_ignores_notes() {
        let diag = Diagnostic::unknown_port("x").with_note("hidden");
        let out = TerminalRenderer::new(RenderStyle::Plain).render(&diag);
        assert!(!out.contains("hidden"));
    }

    #[test]
    fn coded_with_notes() {
        let diag = Diagnostic::unknown_port("x").with_note("known ports: rst, en");
        let out = TerminalRenderer::new(RenderStyle::Coded).render(&diag);
        assert!(out.starts_with("warning[W001]: requested port 'x' not found."));
        assert!(out.contains("   = note: known ports: rst, en"));
    }
}
