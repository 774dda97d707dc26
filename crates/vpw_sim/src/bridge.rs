//! The signal bridge: named writes into a model and snapshots out of it.

use std::sync::Arc;

use vpw_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};

use crate::error::SimError;
use crate::ports::PortRegistry;
use crate::snapshot::Snapshot;

/// Which ports a snapshot covers. The clock is never included.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SnapshotScope {
    /// Every port but the clock.
    #[default]
    AllSignals,
    /// Outputs and bidirectional fields only.
    ObservableOnly,
}

impl SnapshotScope {
    /// Picks the scope from the `snapshot.include_inputs` setting.
    pub fn from_include_inputs(include_inputs: bool) -> Self {
        if include_inputs {
            SnapshotScope::AllSignals
        } else {
            SnapshotScope::ObservableOnly
        }
    }
}

/// Applies `prep` writes and takes snapshots against a port registry.
///
/// Unknown port names and surplus array words are reported to the
/// diagnostic sink and otherwise ignored.
#[derive(Debug, Clone)]
pub struct SignalBridge {
    scope: SnapshotScope,
    diagnostics: Arc<DiagnosticSink>,
}

impl SignalBridge {
    /// Creates a bridge reporting into `diagnostics`.
    pub fn new(scope: SnapshotScope, diagnostics: Arc<DiagnosticSink>) -> Self {
        Self { scope, diagnostics }
    }

    /// The sink warnings are reported to.
    pub fn diagnostics(&self) -> &Arc<DiagnosticSink> {
        &self.diagnostics
    }

    /// Writes `values` into the named input or bidirectional port.
    ///
    /// An empty `values` is an error. A name that does not resolve to a
    /// writable port emits a `W001` warning and leaves the model untouched.
    pub fn prep<M>(
        &self,
        registry: &PortRegistry<M>,
        model: &mut M,
        name: &str,
        values: &[u64],
    ) -> Result<(), SimError> {
        if values.is_empty() {
            return Err(SimError::EmptyValue {
                port: name.to_string(),
            });
        }
        let Some(port) = registry.writable(name) else {
            tracing::debug!(port = name, "prep of unknown port skipped");
            self.diagnostics.emit(Diagnostic::unknown_port(name));
            return Ok(());
        };
        let surplus = port.write(model, values);
        if surplus > 0 {
            self.diagnostics.emit(
                Diagnostic::warning(
                    DiagnosticCode::SURPLUS_WORDS,
                    format!("{surplus} surplus value(s) for port '{name}' ignored."),
                )
                .with_note(format!(
                    "'{name}' holds {} words",
                    port.width().word_count()
                )),
            );
        }
        tracing::trace!(port = name, ?values, "prep");
        Ok(())
    }

    /// Reads every port in scope off the live model.
    pub fn update<M>(&self, registry: &PortRegistry<M>, model: &M) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for i in registry.signal_indices() {
            let port = registry.port_at(i);
            if self.scope == SnapshotScope::ObservableOnly && !port.direction().is_observable() {
                continue;
            }
            snapshot.insert(port.name(), port.read(model));
        }
        snapshot
    }
}
