//! The clock sequencer: one full clock period per `tick`.

use crate::bridge::SignalBridge;
use crate::error::SimError;
use crate::model::SimModel;
use crate::ports::PortRegistry;
use crate::snapshot::Snapshot;
use crate::time::{ClockSchedule, Phase, TickCount};
use crate::waveform::TraceBinding;

/// Owns simulated time and steps a model through each clock period.
///
/// A tick evaluates with the clock low, captures the snapshot, drives the
/// clock high and evaluates, then drives it low and evaluates again. A
/// trace frame is dumped after each evaluation and the recorder is flushed
/// once the period is complete.
#[derive(Debug, Clone)]
pub struct ClockSequencer {
    ticks: TickCount,
    schedule: ClockSchedule,
}

impl ClockSequencer {
    /// Creates a sequencer at tick zero.
    pub fn new(schedule: ClockSchedule) -> Self {
        Self {
            ticks: TickCount::zero(),
            schedule,
        }
    }

    /// Number of ticks started so far.
    pub fn ticks(&self) -> TickCount {
        self.ticks
    }

    /// The trace offsets in use.
    pub fn schedule(&self) -> ClockSchedule {
        self.schedule
    }

    /// Runs one clock period and returns the pre-edge snapshot.
    pub(crate) fn tick<M: SimModel>(
        &mut self,
        model: &mut M,
        registry: &PortRegistry<M>,
        bridge: &SignalBridge,
        mut trace: Option<&mut TraceBinding>,
    ) -> Result<Snapshot, SimError> {
        let clock = registry.clock().ok_or(SimError::NoClock)?;
        let tick = self.ticks.advance();

        self.step(tick, Phase::Settle, model, registry, trace.as_deref_mut())?;
        let snapshot = bridge.update(registry, model);

        clock.drive(model, 1);
        self.step(tick, Phase::Rising, model, registry, trace.as_deref_mut())?;

        clock.drive(model, 0);
        self.step(tick, Phase::Falling, model, registry, trace.as_deref_mut())?;

        if let Some(trace) = trace {
            trace.flush()?;
        }
        tracing::trace!(tick = tick.get(), "tick complete");
        Ok(snapshot)
    }

    fn step<M: SimModel>(
        &self,
        tick: TickCount,
        phase: Phase,
        model: &mut M,
        registry: &PortRegistry<M>,
        trace: Option<&mut TraceBinding>,
    ) -> Result<(), SimError> {
        let time = self.schedule.time_of(tick, phase)?;
        model.set_time(time);
        model.eval();
        if let Some(trace) = trace {
            trace.dump(time, registry, model)?;
        }
        Ok(())
    }
}
