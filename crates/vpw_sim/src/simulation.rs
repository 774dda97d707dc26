//! The simulation context: one model, its registry, clock and trace.
//!
//! [`Simulation`] is created by [`init`](Simulation::init) and consumed by
//! [`finish`](Simulation::finish), so no operation can reach the model
//! before it exists or after it is released. Several simulations may live
//! side by side in one process.

use std::path::PathBuf;
use std::sync::Arc;

use vpw_common::Timescale;
use vpw_config::HarnessConfig;
use vpw_diagnostics::{DiagnosticSink, RenderStyle};

use crate::bridge::{SignalBridge, SnapshotScope};
use crate::clock::ClockSequencer;
use crate::error::SimError;
use crate::model::SimModel;
use crate::ports::PortRegistry;
use crate::snapshot::Snapshot;
use crate::time::ClockSchedule;
use crate::waveform::{TraceBinding, TraceRecorder, VcdRecorder};

/// Settings for a simulation, usually derived from `vpw.toml`.
#[derive(Debug, Clone)]
pub struct SimOptions {
    /// Where to write the VCD trace; `None` disables tracing.
    pub trace_path: Option<PathBuf>,
    /// Scope name the traced ports are declared under.
    pub trace_scope: String,
    /// Trace hierarchy depth; 0 declares no variables.
    pub trace_depth: u32,
    /// `$timescale` of the trace.
    pub timescale: Timescale,
    /// Trace offsets around each clock edge.
    pub schedule: ClockSchedule,
    /// Which ports snapshots cover.
    pub snapshot_scope: SnapshotScope,
    /// Port to drive as the clock instead of the declared one.
    pub clock_port: Option<String>,
    /// Sink receiving unknown-port and surplus-word warnings.
    pub diagnostics: Arc<DiagnosticSink>,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            trace_path: None,
            trace_scope: "top".to_string(),
            trace_depth: 99,
            timescale: Timescale::default(),
            schedule: ClockSchedule::default(),
            snapshot_scope: SnapshotScope::default(),
            clock_port: None,
            diagnostics: Arc::new(DiagnosticSink::echoing(RenderStyle::Plain)),
        }
    }
}

impl SimOptions {
    /// Derives options from a configuration.
    ///
    /// The clock offsets are checked here, since a `HarnessConfig` built in
    /// code has not been through `load_config` validation.
    pub fn from_config(config: &HarnessConfig) -> Result<Self, SimError> {
        Ok(Self {
            trace_path: config.trace.enabled.then(|| config.trace_path()),
            trace_scope: config.module().to_string(),
            trace_depth: config.trace.depth,
            timescale: config.trace.timescale,
            schedule: ClockSchedule::try_from(config.clock)?,
            snapshot_scope: SnapshotScope::from_include_inputs(config.snapshot.include_inputs),
            clock_port: Some(config.package.clock.clone()),
            ..Self::default()
        })
    }

    /// Replaces the diagnostic sink.
    pub fn with_diagnostics(mut self, diagnostics: Arc<DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Turns tracing off regardless of the configured path.
    pub fn without_trace(mut self) -> Self {
        self.trace_path = None;
        self
    }
}

/// A live simulation of one model.
pub struct Simulation<M: SimModel> {
    model: M,
    registry: PortRegistry<M>,
    bridge: SignalBridge,
    sequencer: ClockSequencer,
    trace: Option<TraceBinding>,
}

impl<M: SimModel> Simulation<M> {
    /// Takes ownership of `model` and opens the VCD trace if one is configured.
    ///
    /// Fails if the model has no clock, the configured clock port does not
    /// exist, or the trace file cannot be created.
    pub fn init(model: M, options: &SimOptions) -> Result<Self, SimError> {
        let recorder = match &options.trace_path {
            Some(path) => {
                let vcd = VcdRecorder::create(path)?.with_timescale(options.timescale);
                Some(Box::new(vcd) as Box<dyn TraceRecorder>)
            }
            None => None,
        };
        Self::start(model, options, recorder)
    }

    /// Like [`init`](Self::init), tracing into a caller-supplied recorder.
    ///
    /// `options.trace_path` is ignored.
    pub fn init_with_recorder(
        model: M,
        options: &SimOptions,
        recorder: Box<dyn TraceRecorder>,
    ) -> Result<Self, SimError> {
        Self::start(model, options, Some(recorder))
    }

    fn start(
        model: M,
        options: &SimOptions,
        recorder: Option<Box<dyn TraceRecorder>>,
    ) -> Result<Self, SimError> {
        let mut registry = M::registry()?;
        if let Some(name) = &options.clock_port {
            registry.designate_clock(name)?;
        }
        if registry.clock().is_none() {
            return Err(SimError::NoClock);
        }
        let trace = recorder
            .map(|r| TraceBinding::bind(r, &registry, &options.trace_scope, options.trace_depth))
            .transpose()?;
        tracing::debug!(
            ports = registry.len(),
            tracing = trace.is_some(),
            "simulation initialized"
        );
        Ok(Self {
            model,
            registry,
            bridge: SignalBridge::new(options.snapshot_scope, Arc::clone(&options.diagnostics)),
            sequencer: ClockSequencer::new(options.schedule),
            trace,
        })
    }

    /// Writes `values` into the named input or bidirectional port.
    ///
    /// Takes effect at the next `tick`. An unknown name is reported as a
    /// warning and skipped; an empty `values` is an error.
    pub fn prep(&mut self, name: &str, values: &[u64]) -> Result<(), SimError> {
        self.bridge
            .prep(&self.registry, &mut self.model, name, values)
    }

    /// Reads every port in scope off the model as it is right now.
    pub fn update(&self) -> Snapshot {
        self.bridge.update(&self.registry, &self.model)
    }

    /// Advances the model one clock period and returns the pre-edge snapshot.
    pub fn tick(&mut self) -> Result<Snapshot, SimError> {
        self.sequencer.tick(
            &mut self.model,
            &self.registry,
            &self.bridge,
            self.trace.as_mut(),
        )
    }

    /// Number of ticks run since `init`.
    pub fn timestamp(&self) -> u64 {
        self.sequencer.ticks().get()
    }

    /// Returns `true` if a trace recorder is attached.
    pub fn is_tracing(&self) -> bool {
        self.trace.is_some()
    }

    /// The model under simulation.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// The model's port registry, with the clock designation applied.
    pub fn registry(&self) -> &PortRegistry<M> {
        &self.registry
    }

    /// The sink receiving harness warnings.
    pub fn diagnostics(&self) -> &Arc<DiagnosticSink> {
        self.bridge.diagnostics()
    }

    /// Closes the trace and hands the model back for inspection.
    pub fn finish(mut self) -> Result<M, SimError> {
        if let Some(trace) = self.trace.as_mut() {
            trace.close()?;
        }
        tracing::debug!(ticks = self.timestamp(), "simulation finished");
        Ok(self.model)
    }
}
